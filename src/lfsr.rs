// Copyright 2017 Adam Greig

use std::collections::BTreeSet;
use std::fmt;
use std::mem;

use log::debug;
use rand::Rng;

use crate::error::{Error, Result};
use crate::{BinaryPolynomial, BinaryVector};

/// A Fibonacci linear-feedback shift register over GF(2).
///
/// The register is described by a tap set. Tap `p` addresses `state[p-1]`, the bit
/// `p` places in from the most significant end; tap 0 is the constant term of the
/// feedback polynomial and contributes nothing. The register length is the
/// largest tap.
///
/// Each clock XORs the tapped bits together, shifts the result in at index 0 and
/// drops the bit at the far end. The new last bit is the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lfsr {
    taps: BTreeSet<usize>,
    length: usize,

    /// `mask[p-1]` is set for every non-zero tap `p`.
    mask: BinaryVector,
    state: BinaryVector,
    output: bool,
}

fn check_taps(taps: &[usize]) -> Result<(BTreeSet<usize>, usize)> {
    let taps: BTreeSet<usize> = taps.iter().copied().collect();
    let length = *taps.last().ok_or(Error::EmptyTaps)?;
    if length < 1 {
        return Err(Error::ZeroDegree);
    }
    Ok((taps, length))
}

impl Lfsr {
    /// Make a register with every state bit set.
    pub fn new(taps: &[usize]) -> Result<Lfsr> {
        let (taps, length) = check_taps(taps)?;
        Ok(Lfsr::from_parts(taps, length, BinaryVector::ones(length)))
    }

    /// Make a register loaded with `seed`, left-padded with zeros up to the register
    /// length. Seeds longer than the register are rejected.
    pub fn with_seed(taps: &[usize], seed: &BinaryVector) -> Result<Lfsr> {
        let (taps, length) = check_taps(taps)?;
        if seed.len() > length {
            return Err(Error::SeedTooLong { length, found: seed.len() });
        }
        let state = seed >> (length - seed.len());
        Ok(Lfsr::from_parts(taps, length, state))
    }

    /// Make a register loaded with a uniformly random non-zero state.
    pub fn random<R: Rng + ?Sized>(taps: &[usize], rng: &mut R) -> Result<Lfsr> {
        let (taps, length) = check_taps(taps)?;
        let mut state = BinaryVector::random(length, rng);
        while state.count_ones() == 0 {
            state = BinaryVector::random(length, rng);
        }
        Ok(Lfsr::from_parts(taps, length, state))
    }

    /// Make the register described by the connection polynomial `poly` whose first
    /// `poly.degree()` outputs are the leading bits of `prefix`.
    ///
    /// Together with [`berlekamp_massey`](crate::berlekamp_massey) this replays an
    /// observed sequence from its first few bits.
    pub fn from_polynomial(poly: &BinaryPolynomial, prefix: &BinaryVector) -> Result<Lfsr> {
        if poly.degree() < 1 {
            return Err(Error::ZeroDegree);
        }
        let degree = poly.degree() as usize;
        if prefix.len() < degree {
            return Err(Error::SeedTooShort { required: degree, found: prefix.len() });
        }

        // The outputs are s_1 .. s_d with s_d = sum of s_(d-p) over the taps, so the
        // bit still to be shifted out, s_0, is fixed by the others.
        let taps = poly.taps();
        let mut first = prefix[degree - 1];
        for &tap in taps.iter().filter(|&&tap| tap >= 1 && tap < degree) {
            first ^= prefix[degree - tap - 1];
        }
        let mut state = prefix.slice(0..degree - 1).reversed();
        state.push(first);

        let (taps, length) = check_taps(&taps)?;
        Ok(Lfsr::from_parts(taps, length, state))
    }

    fn from_parts(taps: BTreeSet<usize>, length: usize, state: BinaryVector) -> Lfsr {
        let mut mask = BinaryVector::zeros(length);
        for &tap in taps.iter().filter(|&&tap| tap != 0) {
            mask.set(tap - 1, true);
        }
        let output = state[length - 1];
        debug!("new LFSR with taps {:?}, state {}", taps, state);
        Lfsr { taps, length, mask, state, output }
    }

    pub fn taps(&self) -> &BTreeSet<usize> {
        &self.taps
    }

    /// The feedback polynomial, e.g. `x^5 + x^2 + 1` for taps `{5, 2, 0}`.
    pub fn polynomial(&self) -> BinaryPolynomial {
        let taps: Vec<usize> = self.taps.iter().copied().collect();
        BinaryPolynomial::from_taps(&taps)
    }

    /// Number of bits in the register, the largest tap.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn state(&self) -> &BinaryVector {
        &self.state
    }

    /// The most recently emitted bit, i.e. the last bit of the state.
    pub fn output(&self) -> bool {
        self.output
    }

    /// Replace the state. The new state must have exactly `length` bits.
    pub fn set_state(&mut self, state: &BinaryVector) -> Result<()> {
        self.check_state(state)?;
        self.state = state.clone();
        self.output = self.state[self.length - 1];
        Ok(())
    }

    fn check_state(&self, state: &BinaryVector) -> Result<()> {
        if state.len() != self.length {
            return Err(Error::LengthMismatch { expected: self.length, found: state.len() });
        }
        Ok(())
    }

    /// Clock the register once, returning the emitted bit.
    pub fn step(&mut self) -> bool {
        let feedback = (&self.state & &self.mask).parity();
        self.state.shift_in(feedback);
        self.output = self.state[self.length - 1];
        self.output
    }

    /// Clock `n` times and return the emitted bits.
    ///
    /// If `scratch` is given the run starts from that state instead, and the register
    /// is put back exactly as it was afterwards. Otherwise the register advances.
    pub fn run(&mut self, n: usize, scratch: Option<&BinaryVector>) -> Result<BinaryVector> {
        let saved = self.swap_in(scratch)?;
        let bits = (0..n).map(|_| self.step()).collect();
        self.restore(saved);
        Ok(bits)
    }

    /// Clock until the state comes back to where it started, returning every emitted
    /// bit. Stops after `2^length` steps regardless.
    ///
    /// A `scratch` state is used and then discarded as for [`Lfsr::run`].
    pub fn cycle(&mut self, scratch: Option<&BinaryVector>) -> Result<BinaryVector> {
        let limit = if self.length >= 64 { u64::MAX } else { 1u64 << self.length };
        self.cycle_within(limit, scratch)
    }

    fn cycle_within(&mut self, limit: u64, scratch: Option<&BinaryVector>)
        -> Result<BinaryVector>
    {
        let saved = self.swap_in(scratch)?;
        let start = self.state.clone();
        let mut bits = BinaryVector::default();
        let mut steps = 0u64;
        loop {
            bits.push(self.step());
            steps += 1;
            if self.state == start {
                break;
            }
            if steps >= limit {
                debug!("cycle from {} stopped after {} steps", start, limit);
                break;
            }
        }
        self.restore(saved);
        Ok(bits)
    }

    fn swap_in(&mut self, scratch: Option<&BinaryVector>)
        -> Result<Option<(BinaryVector, bool)>>
    {
        match scratch {
            None => Ok(None),
            Some(state) => {
                self.check_state(state)?;
                let output = state[self.length - 1];
                let old_state = mem::replace(&mut self.state, state.clone());
                let old_output = mem::replace(&mut self.output, output);
                Ok(Some((old_state, old_output)))
            }
        }
    }

    fn restore(&mut self, saved: Option<(BinaryVector, bool)>) {
        if let Some((state, output)) = saved {
            self.state = state;
            self.output = output;
        }
    }
}

/// An endless stream of output bits.
impl Iterator for Lfsr {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        Some(self.step())
    }
}

impl fmt::Display for Lfsr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let taps: Vec<String> = self.taps.iter().rev().map(|tap| tap.to_string()).collect();
        write!(f, "Lfsr(taps={{{}}}, length={}, state={})", taps.join(","), self.length, self.state)
    }
}

#[cfg(test)]
mod tests {
    use crate::{BinaryVector, Error, Lfsr};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn bv(s: &str) -> BinaryVector {
        s.parse().unwrap()
    }

    #[test]
    fn test_length() {
        for taps in [&[1][..], &[3, 1][..], &[5, 2, 0][..], &[0, 16, 14, 13, 11][..], &[2, 7, 1][..]] {
            let lfsr = Lfsr::new(taps).unwrap();
            assert_eq!(lfsr.length(), *taps.iter().max().unwrap());
            assert_eq!(lfsr.state().len(), lfsr.length());
        }
    }

    #[test]
    fn test_invalid_taps() {
        assert_eq!(Lfsr::new(&[]), Err(Error::EmptyTaps));
        assert_eq!(Lfsr::new(&[0]), Err(Error::ZeroDegree));
        assert_eq!(Lfsr::new(&[0, 0]), Err(Error::ZeroDegree));
    }

    #[test]
    fn test_seed() {
        let lfsr = Lfsr::with_seed(&[5, 2, 0], &BinaryVector::from_u64(0b101)).unwrap();
        assert_eq!(lfsr.state(), &bv("00101"));
        assert!(lfsr.output());

        let lfsr = Lfsr::with_seed(&[4, 1], &bv("0110")).unwrap();
        assert_eq!(lfsr.state(), &bv("0110"));
        assert!(!lfsr.output());

        assert_eq!(Lfsr::with_seed(&[3, 1], &bv("1011")),
                   Err(Error::SeedTooLong { length: 3, found: 4 }));

        let lfsr = Lfsr::new(&[4, 1, 0]).unwrap();
        assert_eq!(lfsr.state(), &bv("1111"));
    }

    #[test]
    fn test_step() {
        // Feedback is state[2] ^ state[0] = 1 ^ 1 = 0
        let mut lfsr = Lfsr::with_seed(&[3, 1], &BinaryVector::from_u64(0b111)).unwrap();
        assert!(lfsr.step());
        assert_eq!(lfsr.state(), &bv("011"));
        assert!(lfsr.output());

        // Feedback from 011 is 1 ^ 0 = 1, giving 101
        assert!(lfsr.step());
        assert_eq!(lfsr.state(), &bv("101"));

        // Tap 0 contributes nothing
        let mut a = Lfsr::new(&[3, 1, 0]).unwrap();
        let mut b = Lfsr::new(&[3, 1]).unwrap();
        for _ in 0..20 {
            assert_eq!(a.step(), b.step());
        }
    }

    #[test]
    fn test_run() {
        let mut lfsr = Lfsr::new(&[5, 2, 0]).unwrap();
        assert_eq!(lfsr.run(20, None).unwrap(), bv("11110011010010000101"));

        let mut lfsr = Lfsr::new(&[3, 1, 0]).unwrap();
        assert_eq!(lfsr.run(20, None).unwrap(), bv("11010011101001110100"));

        let mut lfsr = Lfsr::with_seed(&[4, 3], &bv("0001")).unwrap();
        assert_eq!(lfsr.run(20, None).unwrap(), bv("00010011010111100010"));

        assert!(lfsr.run(0, None).unwrap().is_empty());
    }

    #[test]
    fn test_run_advances() {
        let mut a = Lfsr::new(&[5, 2, 0]).unwrap();
        let mut b = a.clone();
        let bits = a.run(7, None).unwrap();
        let stepped: BinaryVector = (0..7).map(|_| b.step()).collect();
        assert_eq!(bits, stepped);
        assert_eq!(a, b);
    }

    #[test]
    fn test_run_scratch() {
        let mut lfsr = Lfsr::new(&[5, 2, 0]).unwrap();
        lfsr.run(3, None).unwrap();
        let before = lfsr.clone();

        let bits = lfsr.run(12, Some(&bv("10000"))).unwrap();
        assert_eq!(bits.len(), 12);
        assert_eq!(lfsr, before);

        let mut fresh = Lfsr::with_seed(&[5, 2, 0], &bv("10000")).unwrap();
        assert_eq!(bits, fresh.run(12, None).unwrap());

        assert_eq!(lfsr.run(4, Some(&bv("101"))),
                   Err(Error::LengthMismatch { expected: 5, found: 3 }));
        assert_eq!(lfsr, before);
    }

    #[test]
    fn test_cycle() {
        // Primitive polynomials give the full 2^n - 1 period
        for (taps, period) in [(&[5, 2, 0][..], 31), (&[3, 1, 0][..], 7), (&[4, 1, 0][..], 15),
                               (&[7, 6][..], 127), (&[9, 5][..], 511)] {
            let mut lfsr = Lfsr::new(taps).unwrap();
            let start = lfsr.state().clone();
            let bits = Lfsr::cycle(&mut lfsr, None).unwrap();
            assert_eq!(bits.len(), period);
            assert_eq!(lfsr.state(), &start);
        }

        // The all-zero state is a fixed point
        let mut lfsr = Lfsr::new(&[5, 2, 0]).unwrap();
        assert_eq!(Lfsr::cycle(&mut lfsr, Some(&bv("00000"))).unwrap(), bv("0"));
        assert_eq!(lfsr.state(), &bv("11111"));

        // x^4 + x^2 + 1 = (x^2 + x + 1)^2 splits the states into short cycles
        let mut lfsr = Lfsr::new(&[4, 2, 0]).unwrap();
        let bits = Lfsr::cycle(&mut lfsr, None).unwrap();
        assert_eq!(bits.len(), 6);
        assert!(bits.len() < 16);
        assert_eq!(Lfsr::cycle(&mut lfsr, Some(&bv("0110"))).unwrap().len(), 3);
    }

    #[test]
    fn test_cycle_bounded() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let length: usize = rng.gen_range(1..=8);
            let mut taps = vec![length];
            for tap in 0..length {
                if rng.gen_bool(0.5) {
                    taps.push(tap);
                }
            }
            let mut lfsr = Lfsr::random(&taps, &mut rng).unwrap();
            let start = lfsr.state().clone();
            let bits = Lfsr::cycle(&mut lfsr, None).unwrap();
            assert!(bits.len() <= 1 << length);
            assert_eq!(lfsr.state(), &start);
        }
    }

    #[test]
    fn test_cycle_limit() {
        let mut lfsr = Lfsr::new(&[5, 2, 0]).unwrap();
        let bits = lfsr.cycle_within(10, None).unwrap();
        assert_eq!(bits, bv("1111001101"));
        assert_ne!(lfsr.state(), &bv("11111"));

        let mut lfsr = Lfsr::new(&[5, 2, 0]).unwrap();
        let bits = lfsr.cycle_within(10, Some(&bv("00001"))).unwrap();
        assert_eq!(bits.len(), 10);
        assert_eq!(lfsr.state(), &bv("11111"));

        assert_eq!(Lfsr::cycle(&mut lfsr, Some(&bv("1"))), Err(Error::LengthMismatch { expected: 5, found: 1 }));
    }

    #[test]
    fn test_set_state() {
        let mut lfsr = Lfsr::new(&[3, 1]).unwrap();
        lfsr.set_state(&bv("110")).unwrap();
        assert!(!lfsr.output());
        assert_eq!(lfsr.set_state(&bv("1100")),
                   Err(Error::LengthMismatch { expected: 3, found: 4 }));
        assert_eq!(lfsr.state(), &bv("110"));
    }

    #[test]
    fn test_from_polynomial() {
        let mut source = Lfsr::with_seed(&[4, 3], &bv("1001")).unwrap();
        let bits = source.run(30, None).unwrap();

        let mut replay = Lfsr::from_polynomial(&source.polynomial(), &bits).unwrap();
        assert_eq!(replay.length(), 4);
        assert_eq!(replay.run(30, None).unwrap(), bits);

        let short = bits.slice(0..2);
        assert_eq!(Lfsr::from_polynomial(&source.polynomial(), &short),
                   Err(Error::SeedTooShort { required: 4, found: 2 }));
    }

    #[test]
    fn test_random() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let lfsr = Lfsr::random(&[2, 1], &mut rng).unwrap();
            assert_eq!(lfsr.length(), 2);
            assert!(lfsr.state().count_ones() > 0);
        }
    }

    #[test]
    fn test_iterator() {
        let lfsr = Lfsr::new(&[5, 2, 0]).unwrap();
        let bits: BinaryVector = lfsr.take(8).collect();
        assert_eq!(bits, bv("11110011"));
    }

    #[test]
    fn test_display() {
        let lfsr = Lfsr::with_seed(&[0, 2, 5], &bv("10")).unwrap();
        assert_eq!(lfsr.to_string(), "Lfsr(taps={5,2,0}, length=5, state=00010)");
        assert_eq!(lfsr.polynomial().to_string(), "x^5 + x^2 + 1");
    }
}
