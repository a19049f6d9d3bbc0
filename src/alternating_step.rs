// Copyright 2017 Adam Greig

use log::debug;

use crate::error::{Error, Result};
use crate::{BinaryVector, Lfsr};

/// Taps of the control register, `x^5 + x^2 + 1`.
pub const DEFAULT_CONTROL_TAPS: [usize; 3] = [5, 2, 0];
/// Taps of the first data register, `x^3 + x + 1`.
pub const DEFAULT_DATA0_TAPS: [usize; 3] = [3, 1, 0];
/// Taps of the second data register, `x^4 + x + 1`.
pub const DEFAULT_DATA1_TAPS: [usize; 3] = [4, 1, 0];

/// Register layout and initial state of an [`AlternatingStep`] generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlternatingStepConfig {
    pub control: Vec<usize>,
    pub data0: Vec<usize>,
    pub data1: Vec<usize>,

    /// Combined seed, split in order across the control, data0 and data1 registers.
    /// Bits past the total register length are ignored. `None` sets every bit.
    pub seed: Option<BinaryVector>,
}

impl Default for AlternatingStepConfig {
    fn default() -> AlternatingStepConfig {
        AlternatingStepConfig {
            control: DEFAULT_CONTROL_TAPS.to_vec(),
            data0: DEFAULT_DATA0_TAPS.to_vec(),
            data1: DEFAULT_DATA1_TAPS.to_vec(),
            seed: None,
        }
    }
}

/// Alternating-step keystream generator.
///
/// Each step clocks the control register once. A control bit of 0 clocks `data0`
/// while `data1` holds its last output; a 1 clocks `data1` while `data0` holds. The
/// keystream bit is the XOR of the two data outputs.
///
/// The generator has no reset: every bit drawn moves it on for good.
#[derive(Clone, Debug)]
pub struct AlternatingStep {
    control: Lfsr,
    data0: Lfsr,
    data1: Lfsr,
    output: Option<bool>,
}

impl AlternatingStep {
    /// A generator with the default taps and all-ones registers.
    pub fn new() -> Result<AlternatingStep> {
        AlternatingStep::from_config(&AlternatingStepConfig::default())
    }

    pub fn from_config(config: &AlternatingStepConfig) -> Result<AlternatingStep> {
        let mut control = Lfsr::new(&config.control)?;
        let mut data0 = Lfsr::new(&config.data0)?;
        let mut data1 = Lfsr::new(&config.data1)?;

        if let Some(seed) = &config.seed {
            let split0 = control.length();
            let split1 = split0 + data0.length();
            let total = split1 + data1.length();
            if seed.len() < total {
                return Err(Error::SeedTooShort { required: total, found: seed.len() });
            }
            control.set_state(&seed.slice(0..split0))?;
            data0.set_state(&seed.slice(split0..split1))?;
            data1.set_state(&seed.slice(split1..total))?;
        }

        debug!("alternating step generator: control {}, data0 {}, data1 {}",
               control, data0, data1);
        Ok(AlternatingStep { control, data0, data1, output: None })
    }

    /// Produce the next keystream bit.
    pub fn step(&mut self) -> bool {
        let bit = if self.control.step() {
            self.data1.step() ^ self.data0.output()
        } else {
            self.data0.step() ^ self.data1.output()
        };
        self.output = Some(bit);
        bit
    }

    /// The next `n` keystream bits.
    pub fn keystream(&mut self, n: usize) -> BinaryVector {
        (0..n).map(|_| self.step()).collect()
    }

    /// XOR `buf` in place with the next `8 * buf.len()` keystream bits, packed MSbit
    /// first into bytes.
    pub fn apply_keystream(&mut self, buf: &mut [u8]) {
        let keystream = self.keystream(buf.len() * 8).to_bytes();
        for (byte, key) in buf.iter_mut().zip(keystream) {
            *byte ^= key;
        }
    }

    pub fn control(&self) -> &Lfsr {
        &self.control
    }

    pub fn data0(&self) -> &Lfsr {
        &self.data0
    }

    pub fn data1(&self) -> &Lfsr {
        &self.data1
    }

    /// The last keystream bit produced, if any.
    pub fn output(&self) -> Option<bool> {
        self.output
    }
}

/// An endless keystream.
impl Iterator for AlternatingStep {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        Some(self.step())
    }
}
