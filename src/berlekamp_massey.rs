// Copyright 2017 Adam Greig

use log::trace;

use crate::{BinaryPolynomial, BinaryVector};

/// Find the minimal polynomial which generates the sequence `s`,
/// using the Berlekamp-Massey algorithm.
///
/// Returns the connection polynomial `c0 + c1.x + ... + cL.x^L`, where `L` is the linear
/// complexity of `s`, together with `L`. The polynomial always has exactly `L + 1`
/// coefficients and `c0 = 1`; every `s[t]` with `t >= L` is the XOR of `s[t-j]` over
/// the `j >= 1` with `cj` set.
pub fn berlekamp_massey(s: &BinaryVector) -> (BinaryPolynomial, usize) {
    // Reversed so that s[tau], s[tau-1], ... is a contiguous slice.
    let rev = s.reversed();
    let n = s.len();

    // c holds the candidate polynomial, b the candidate before the last length change.
    let mut c = BinaryPolynomial::from_coefficients(&[1]);
    let mut b = c.clone();
    let mut l = 0usize;
    let mut r = 1usize;
    for tau in 0..n {
        let k = l.min(tau) + 1;
        if c.coefficients.len() < k {
            c.coefficients.resize(k);
        }
        let window = rev.slice((n - 1 - tau)..(n - 1 - tau + k));
        let prefix = BinaryPolynomial { coefficients: c.coefficients.slice(0..k) };
        if prefix.eval(&window) {
            // c(x) += x^r . b(x)
            let mut shifted = &b.coefficients >> r;
            let len = c.coefficients.len().max(shifted.len());
            shifted.resize(len);
            let t = c.clone();
            c.coefficients.resize(len);
            c.coefficients ^= &shifted;
            if 2 * l <= tau {
                b = t;
                l = tau + 1 - l;
                r = 0;
                trace!("linear complexity now {} after {} bits", l, tau + 1);
            }
        }
        r += 1;
    }
    c.coefficients.resize(l + 1);
    (c, l)
}
