// Copyright 2017 Adam Greig

use thiserror::Error;

/// Errors raised by register construction and bit vector operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("tap set must contain at least one position")]
    EmptyTaps,

    #[error("tap set must have degree >= 1")]
    ZeroDegree,

    #[error("seed has {found} bits but {required} are required")]
    SeedTooShort { required: usize, found: usize },

    #[error("seed has {found} bits but the register only holds {length}")]
    SeedTooLong { length: usize, found: usize },

    #[error("length mismatch: expected {expected} bits, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("invalid character {0:?} in bit string")]
    InvalidBitChar(char),
}

pub type Result<T> = std::result::Result<T, Error>;
