// Copyright 2017 Adam Greig

//! Linear-feedback shift registers over GF(2), the alternating-step keystream
//! generator built from them, and Berlekamp-Massey for recovering the shortest
//! register behind an observed bit sequence.

mod error;
mod binary_vector;
mod binary_polynomial;
mod lfsr;
mod alternating_step;
mod berlekamp_massey;

pub use error::{Error, Result};
pub use binary_vector::BinaryVector;
pub use binary_polynomial::BinaryPolynomial;
pub use lfsr::Lfsr;
pub use alternating_step::{AlternatingStep, AlternatingStepConfig};
pub use alternating_step::{DEFAULT_CONTROL_TAPS, DEFAULT_DATA0_TAPS, DEFAULT_DATA1_TAPS};
pub use berlekamp_massey::berlekamp_massey;

/// Compute the number of u64 words required to store n bits.
#[inline(always)]
pub fn numwords(n: usize) -> usize {
    (n + 63) / 64
}
