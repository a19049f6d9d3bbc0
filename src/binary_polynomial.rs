// Copyright 2017 Adam Greig

use std::fmt;
use std::ops::Index;

use crate::BinaryVector;

/// A polynomial over GF(2), such as the connection polynomial of an LFSR.
///
/// Coefficients are stored constant term first: `coefficients[i]` is the
/// coefficient of `x^i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryPolynomial {
    pub coefficients: BinaryVector,
}

impl Index<usize> for BinaryPolynomial {
    type Output = bool;

    /// Fetch the coefficient of `x^i`
    fn index(&self, i: usize) -> &bool {
        &self.coefficients[i]
    }
}

impl fmt::Display for BinaryPolynomial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut parts = Vec::new();
        for power in (0..self.coefficients.len()).rev() {
            if self.coefficients[power] {
                match power {
                    0 => parts.push("1".to_owned()),
                    1 => parts.push("x".to_owned()),
                    _ => parts.push(format!("x^{}", power)),
                }
            }
        }

        if parts.is_empty() {
            parts.push("0".to_owned());
        }

        write!(f, "{}", parts.join(" + "))
    }
}

impl BinaryPolynomial {
    /// Make a new BinaryPolynomial from the provided coefficients.
    ///
    /// `coefficients` is the slice `[c0, c1, c2, ..., cN]` that represents
    /// the polynomial `c0 + c1.x + ... + cN.x^N`.
    pub fn from_coefficients(coefficients: &[u8]) -> BinaryPolynomial {
        BinaryPolynomial { coefficients: BinaryVector::from_bits(coefficients) }
    }

    /// Make the polynomial whose set coefficients are exactly the given tap positions,
    /// e.g. `{5, 2, 0}` gives `x^5 + x^2 + 1`.
    pub fn from_taps(taps: &[usize]) -> BinaryPolynomial {
        let len = taps.iter().max().map_or(0, |max| max + 1);
        let mut coefficients = BinaryVector::zeros(len);
        for &tap in taps {
            coefficients.set(tap, true);
        }
        BinaryPolynomial { coefficients }
    }

    /// Return the degree of this polynomial, i.e. the highest non-zero-coefficient power.
    pub fn degree(&self) -> isize {
        (0..self.coefficients.len())
            .rev()
            .find(|&power| self.coefficients[power])
            .map_or(-1, |power| power as isize)
    }

    /// Powers with a non-zero coefficient, highest first. Used as an LFSR tap set.
    pub fn taps(&self) -> Vec<usize> {
        (0..self.coefficients.len()).rev().filter(|&power| self.coefficients[power]).collect()
    }

    /// Inner product over GF(2) of the coefficients with `x`.
    ///
    /// `x[i]` pairs with the coefficient of `x^i`; both must have the same length.
    pub fn eval(&self, x: &BinaryVector) -> bool {
        (&self.coefficients & x).parity()
    }
}
