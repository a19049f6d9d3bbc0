// Copyright 2017 Adam Greig

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitXor, BitXorAssign, Index, Range, Shr};
use std::str::FromStr;

use rand::Rng;

use crate::error::{Error, Result};
use crate::numwords;

/// An ordered, growable sequence of bits. Index 0 is the leftmost (most significant) bit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BinaryVector {
    n: usize,

    /// Bits stored packed into u64 words, MSbit first. If `n` is not a multiple of 64,
    /// the final (least significant) bits of the final word are kept at zero.
    data: Vec<u64>,
}

/// Parity of a single word, folded down to a nibble and looked up in 0x6996.
#[inline(always)]
fn word_parity(word: u64) -> bool {
    let mut v = word;
    v ^= v >> 32;
    v ^= v >> 16;
    v ^= v >> 8;
    v ^= v >> 4;
    (0x6996u64 >> (v & 0xf)) & 1 == 1
}

impl Index<usize> for BinaryVector {
    type Output = bool;

    /// Fetch a specific bit in this vector
    fn index(&self, i: usize) -> &bool {
        assert!(i < self.n, "bit index {} out of range for length {}", i, self.n);
        if self.bit(i) {
            &true
        } else {
            &false
        }
    }
}

impl fmt::Display for BinaryVector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_bitstring())
    }
}

impl FromStr for BinaryVector {
    type Err = Error;

    fn from_str(s: &str) -> Result<BinaryVector> {
        BinaryVector::from_bitstring(s)
    }
}

impl FromIterator<bool> for BinaryVector {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> BinaryVector {
        let mut v = BinaryVector::default();
        v.extend(iter);
        v
    }
}

impl Extend<bool> for BinaryVector {
    fn extend<I: IntoIterator<Item = bool>>(&mut self, iter: I) {
        for bit in iter {
            self.push(bit);
        }
    }
}

/// # Panics
///
/// Panics if the operands have different lengths. See [`BinaryVector::and`].
impl<'a> BitAnd for &'a BinaryVector {
    type Output = BinaryVector;
    fn bitand(self, rhs: &'a BinaryVector) -> BinaryVector {
        let mut out = self.clone();
        out &= rhs;
        out
    }
}

impl<'a> BitAndAssign<&'a BinaryVector> for BinaryVector {
    fn bitand_assign(&mut self, rhs: &'a BinaryVector) {
        assert_eq!(self.n, rhs.n);
        for (word, other) in self.data.iter_mut().zip(&rhs.data) {
            *word &= other;
        }
    }
}

/// # Panics
///
/// Panics if the operands have different lengths. See [`BinaryVector::xor`].
impl<'a> BitXor for &'a BinaryVector {
    type Output = BinaryVector;
    fn bitxor(self, rhs: &'a BinaryVector) -> BinaryVector {
        let mut out = self.clone();
        out ^= rhs;
        out
    }
}

impl<'a> BitXorAssign<&'a BinaryVector> for BinaryVector {
    fn bitxor_assign(&mut self, rhs: &'a BinaryVector) {
        assert_eq!(self.n, rhs.n);
        for (word, other) in self.data.iter_mut().zip(&rhs.data) {
            *word ^= other;
        }
    }
}

/// Shift towards the end, prepending `i` zero bits. The result is `i` bits longer.
impl<'a> Shr<usize> for &'a BinaryVector {
    type Output = BinaryVector;
    fn shr(self, i: usize) -> BinaryVector {
        let n = self.n + i;
        let offset = i % 64;
        let mut data = vec![0u64; numwords(n)];
        for (srcidx, word) in self.data.iter().enumerate() {
            let dstidx = srcidx + i / 64;
            data[dstidx] |= word >> offset;
            if offset != 0 && dstidx + 1 < data.len() {
                data[dstidx + 1] |= word << (64 - offset);
            }
        }
        BinaryVector { n, data }
    }
}

impl BinaryVector {
    /// Make a new BinaryVector from the given words (packed)
    ///
    /// `words` contains the packed bits, MSbit first, with the excess bits ignored.
    pub fn from_words(n: usize, words: &[u64]) -> BinaryVector {
        assert!(words.len() >= numwords(n));
        let mut v = BinaryVector { n, data: words[..numwords(n)].to_owned() };
        v.mask_tail();
        v
    }

    /// Make a new BinaryVector from the given bits (unpacked)
    ///
    /// Any non-zero entry is taken as a set bit.
    pub fn from_bits(bits: &[u8]) -> BinaryVector {
        bits.iter().map(|bit| *bit != 0).collect()
    }

    /// Make a new BinaryVector from a string of '0' and '1' characters.
    pub fn from_bitstring(bitstring: &str) -> Result<BinaryVector> {
        bitstring
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                c => Err(Error::InvalidBitChar(c)),
            })
            .collect()
    }

    /// Make a new BinaryVector holding `value` MSbit first, using as many bits as
    /// `value` needs (at least one).
    pub fn from_u64(value: u64) -> BinaryVector {
        let width = (64 - value.leading_zeros() as usize).max(1);
        BinaryVector::from_u64_width(value, width)
    }

    /// Make a new BinaryVector of exactly `width` bits holding the low bits of `value`,
    /// MSbit first. Widths beyond 64 are zero-filled on the left.
    pub fn from_u64_width(value: u64, width: usize) -> BinaryVector {
        (0..width).rev().map(|i| i < 64 && (value >> i) & 1 == 1).collect()
    }

    /// Make a new BinaryVector from raw bytes, 8 bits per byte, MSbit first.
    pub fn from_bytes(bytes: &[u8]) -> BinaryVector {
        let data = bytes
            .chunks(8)
            .map(|chunk| {
                chunk.iter().enumerate().fold(0u64, |word, (k, byte)| {
                    word | ((*byte as u64) << (56 - 8 * k))
                })
            })
            .collect();
        BinaryVector { n: bytes.len() * 8, data }
    }

    /// A vector of `n` cleared bits.
    pub fn zeros(n: usize) -> BinaryVector {
        BinaryVector { n, data: vec![0u64; numwords(n)] }
    }

    /// A vector of `n` set bits.
    pub fn ones(n: usize) -> BinaryVector {
        let mut v = BinaryVector { n, data: vec![!0u64; numwords(n)] };
        v.mask_tail();
        v
    }

    /// A vector of `n` uniformly random bits.
    pub fn random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> BinaryVector {
        let mut v = BinaryVector { n, data: (0..numwords(n)).map(|_| rng.gen()).collect() };
        v.mask_tail();
        v
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline(always)]
    fn bit(&self, i: usize) -> bool {
        self.data[i / 64] >> (63 - (i % 64)) & 1 == 1
    }

    /// Clear any storage bits past `n`, and drop unused words.
    fn mask_tail(&mut self) {
        self.data.truncate(numwords(self.n));
        if self.n % 64 != 0 {
            let last = self.data.len() - 1;
            self.data[last] &= !0u64 << (64 - (self.n % 64));
        }
    }

    pub fn get(&self, i: usize) -> Option<bool> {
        if i < self.n {
            Some(self.bit(i))
        } else {
            None
        }
    }

    /// Overwrite bit `i`.
    pub fn set(&mut self, i: usize, bit: bool) {
        assert!(i < self.n, "bit index {} out of range for length {}", i, self.n);
        let mask = 1u64 << (63 - (i % 64));
        if bit {
            self.data[i / 64] |= mask;
        } else {
            self.data[i / 64] &= !mask;
        }
    }

    /// Append a bit to the end.
    pub fn push(&mut self, bit: bool) {
        if self.n % 64 == 0 {
            self.data.push(0);
        }
        self.n += 1;
        self.set(self.n - 1, bit);
    }

    /// Remove and return the last bit.
    pub fn pop(&mut self) -> Option<bool> {
        let bit = self.get(self.n.checked_sub(1)?)?;
        self.n -= 1;
        self.mask_tail();
        Some(bit)
    }

    /// Remove and return the bit at `index`, moving every later bit one place left.
    pub fn remove(&mut self, index: usize) -> bool {
        assert!(index < self.n, "bit index {} out of range for length {}", index, self.n);
        let bit = self.bit(index);
        for i in index..(self.n - 1) {
            let next = self.bit(i + 1);
            self.set(i, next);
        }
        self.n -= 1;
        self.mask_tail();
        bit
    }

    /// Truncate, or zero-extend at the end, to exactly `n` bits.
    pub fn resize(&mut self, n: usize) {
        self.data.resize(numwords(n), 0);
        self.n = n;
        self.mask_tail();
    }

    /// Shift every bit one place right, inserting `bit` at index 0 and returning the
    /// bit that fell off the end. The length is unchanged.
    pub fn shift_in(&mut self, bit: bool) -> bool {
        assert!(self.n > 0);
        let out = self.bit(self.n - 1);
        let mut carry = bit as u64;
        for word in self.data.iter_mut() {
            let next = *word & 1;
            *word = (*word >> 1) | (carry << 63);
            carry = next;
        }
        self.mask_tail();
        out
    }

    /// Elementwise XOR, failing if the lengths differ.
    pub fn xor(&self, other: &BinaryVector) -> Result<BinaryVector> {
        self.check_len(other)?;
        Ok(self ^ other)
    }

    /// Elementwise AND, failing if the lengths differ.
    pub fn and(&self, other: &BinaryVector) -> Result<BinaryVector> {
        self.check_len(other)?;
        Ok(self & other)
    }

    fn check_len(&self, other: &BinaryVector) -> Result<()> {
        if self.n != other.n {
            return Err(Error::LengthMismatch { expected: self.n, found: other.n });
        }
        Ok(())
    }

    /// A new vector of `self` followed by `other`.
    pub fn concat(&self, other: &BinaryVector) -> BinaryVector {
        let mut out = self.clone();
        out.extend(other.iter());
        out
    }

    /// A new vector of `count` copies of `self` laid end to end.
    pub fn repeat(&self, count: usize) -> BinaryVector {
        let mut out = BinaryVector::default();
        for _ in 0..count {
            out.extend(self.iter());
        }
        out
    }

    /// Pack into bytes MSbit first, zero-padding the last byte on the right.
    pub fn to_bytes(&self) -> Vec<u8> {
        (0..(self.n + 7) / 8)
            .map(|k| (self.data[k / 8] >> (56 - 8 * (k % 8))) as u8)
            .collect()
    }

    /// True if an odd number of bits are set.
    pub fn parity(&self) -> bool {
        self.data.iter().fold(false, |p, word| p ^ word_parity(*word))
    }

    pub fn count_ones(&self) -> usize {
        self.data.iter().map(|word| word.count_ones() as usize).sum()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = bool> + ExactSizeIterator + '_ {
        (0..self.n).map(move |i| self.bit(i))
    }

    /// A new vector with the bit order reversed.
    pub fn reversed(&self) -> BinaryVector {
        self.iter().rev().collect()
    }

    /// Convert to unpacked bits
    pub fn to_bits(&self) -> Vec<u8> {
        self.iter().map(|bit| bit as u8).collect()
    }

    /// Convert to a String of 0/1
    pub fn to_bitstring(&self) -> String {
        self.iter().map(|bit| if bit { '1' } else { '0' }).collect()
    }

    /// Make a new BinaryVector from a range into the current one
    pub fn slice(&self, range: Range<usize>) -> BinaryVector {
        let Range { start, end } = range;
        assert!(end >= start);
        assert!(end <= self.n);
        let n = end - start;
        let offset = start % 64;
        let mut data = Vec::with_capacity(numwords(n));
        for idx in 0..numwords(n) {
            let wordidx = start / 64 + idx;
            let mut word = self.data[wordidx] << offset;
            if offset != 0 && wordidx + 1 < self.data.len() {
                word |= self.data[wordidx + 1] >> (64 - offset);
            }
            data.push(word);
        }
        let mut out = BinaryVector { n, data };
        out.mask_tail();
        out
    }
}
