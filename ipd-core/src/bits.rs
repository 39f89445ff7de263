//! Packed bit sequences
//!
//! Genomes, memory registers and whole-match move records are all stored as
//! [`Bits`]. Statistics over a match are computed with word-wise AND/NOT and
//! population counts instead of per-round branching.

use std::fmt;
use std::ops::{BitAnd, Not};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GenomeError;

const WORD_BITS: usize = 64;

fn words_for(len: usize) -> usize {
    (len + WORD_BITS - 1) / WORD_BITS
}

/// Growable sequence of bits packed into 64-bit words.
///
/// Bit 0 is the least-significant bit of the first word. Bits past `len` in
/// the last word are always zero.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bits {
    words: Vec<u64>,
    len: usize,
}

impl Bits {
    /// All-zero sequence of `len` bits
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; words_for(len)],
            len,
        }
    }

    /// All-one sequence of `len` bits
    pub fn ones(len: usize) -> Self {
        let mut bits = Self {
            words: vec![!0; words_for(len)],
            len,
        };
        bits.clear_tail();
        bits
    }

    /// Low `len` bits of `value`. Panics if `len > 64`.
    pub fn from_uint(value: u64, len: usize) -> Self {
        assert!(len <= WORD_BITS, "cannot import {} bits from a u64", len);
        let mut bits = Self::new(len);
        if let Some(first) = bits.words.first_mut() {
            *first = value;
        }
        bits.clear_tail();
        bits
    }

    /// Unsigned value of the sequence; an empty sequence is 0.
    pub fn to_uint(&self) -> u64 {
        assert!(self.len <= WORD_BITS, "{} bits do not fit in a u64", self.len);
        self.words.first().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len, "bit {} out of range for length {}", index, self.len);
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    pub fn set(&mut self, index: usize, value: bool) {
        assert!(index < self.len, "bit {} out of range for length {}", index, self.len);
        let mask = 1u64 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    pub fn flip(&mut self, index: usize) {
        let current = self.get(index);
        self.set(index, !current);
    }

    pub fn push_back(&mut self, value: bool) {
        if self.len % WORD_BITS == 0 {
            self.words.push(0);
        }
        self.len += 1;
        self.set(self.len - 1, value);
    }

    pub fn pop_back(&mut self) -> Option<bool> {
        if self.len == 0 {
            return None;
        }
        let value = self.get(self.len - 1);
        self.set(self.len - 1, false);
        self.len -= 1;
        if self.len % WORD_BITS == 0 {
            self.words.pop();
        }
        Some(value)
    }

    /// Fixed-width shift register step: `value` becomes bit 0, every other
    /// bit moves up one place and the last bit falls off. No-op when empty.
    pub fn shift_in(&mut self, value: bool) {
        if self.len == 0 {
            return;
        }
        let mut carry = value as u64;
        for word in &mut self.words {
            let next = *word >> (WORD_BITS - 1);
            *word = (*word << 1) | carry;
            carry = next;
        }
        self.clear_tail();
    }

    /// Append every bit of `other` after the current last bit.
    pub fn append(&mut self, other: &Bits) {
        let offset = self.len % WORD_BITS;
        if offset == 0 {
            self.words.extend_from_slice(&other.words);
        } else {
            for &word in &other.words {
                if let Some(last) = self.words.last_mut() {
                    *last |= word << offset;
                }
                self.words.push(word >> (WORD_BITS - offset));
            }
        }
        self.len += other.len;
        self.words.truncate(words_for(self.len));
    }

    pub fn concat(&self, other: &Bits) -> Bits {
        let mut joined = self.clone();
        joined.append(other);
        joined
    }

    /// Sequence with the first `count` bits removed (bit `i` of the result is
    /// bit `i + count` of `self`).
    pub fn drop_front(&self, count: usize) -> Bits {
        assert!(count <= self.len, "cannot drop {} of {} bits", count, self.len);
        let len = self.len - count;
        let word_shift = count / WORD_BITS;
        let bit_shift = count % WORD_BITS;

        let words = (0..words_for(len))
            .map(|i| {
                let low = self.words[i + word_shift] >> bit_shift;
                let high = match self.words.get(i + word_shift + 1) {
                    Some(&next) if bit_shift > 0 => next << (WORD_BITS - bit_shift),
                    _ => 0,
                };
                low | high
            })
            .collect();

        let mut bits = Bits { words, len };
        bits.clear_tail();
        bits
    }

    /// The first `len` bits.
    pub fn truncated(&self, len: usize) -> Bits {
        assert!(len <= self.len, "cannot keep {} of {} bits", len, self.len);
        let mut bits = Bits {
            words: self.words[..words_for(len)].to_vec(),
            len,
        };
        bits.clear_tail();
        bits
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn count_zeros(&self) -> usize {
        self.len - self.count_ones()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    fn clear_tail(&mut self) {
        let used = self.len % WORD_BITS;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << used) - 1;
            }
        }
    }
}

impl BitAnd for &Bits {
    type Output = Bits;

    fn bitand(self, rhs: &Bits) -> Bits {
        assert_eq!(self.len, rhs.len, "bit sequences differ in length");
        Bits {
            words: self.words.iter().zip(&rhs.words).map(|(a, b)| a & b).collect(),
            len: self.len,
        }
    }
}

impl Not for &Bits {
    type Output = Bits;

    fn not(self) -> Bits {
        let mut bits = Bits {
            words: self.words.iter().map(|w| !w).collect(),
            len: self.len,
        };
        bits.clear_tail();
        bits
    }
}

impl FromIterator<bool> for Bits {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut bits = Bits::default();
        for bit in iter {
            bits.push_back(bit);
        }
        bits
    }
}

impl FromStr for Bits {
    type Err = GenomeError;

    /// Character `i` of the string becomes bit `i`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .enumerate()
            .map(|(position, ch)| match ch {
                '1' => Ok(true),
                '0' => Ok(false),
                _ => Err(GenomeError::InvalidBit { ch, position }),
            })
            .collect()
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bits({})", self)
    }
}

impl Serialize for Bits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Bits {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> Bits {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_is_lsb_first() {
        let b = bits("110");
        assert_eq!(b.len(), 3);
        assert_eq!(b.to_uint(), 0b011);
        assert_eq!(b.to_string(), "110");
    }

    #[test]
    fn test_parse_rejects_other_characters() {
        let err = "10x1".parse::<Bits>().unwrap_err();
        assert_eq!(err, GenomeError::InvalidBit { ch: 'x', position: 2 });
    }

    #[test]
    fn test_from_uint_masks_high_bits() {
        let b = Bits::from_uint(0b1111_0101, 4);
        assert_eq!(b.to_uint(), 0b0101);
        assert_eq!(b.count_ones(), 2);
    }

    #[test]
    fn test_empty_sequence_is_zero() {
        let b = Bits::new(0);
        assert!(b.is_empty());
        assert_eq!(b.to_uint(), 0);
        assert_eq!(b.count_zeros(), 0);
    }

    #[test]
    fn test_push_and_pop_across_word_boundary() {
        let mut b = Bits::ones(64);
        b.push_back(false);
        b.push_back(true);
        assert_eq!(b.len(), 66);
        assert_eq!(b.count_ones(), 65);
        assert_eq!(b.pop_back(), Some(true));
        assert_eq!(b.pop_back(), Some(false));
        assert_eq!(b.pop_back(), Some(true));
        assert_eq!(b.len(), 63);
        assert_eq!(b.count_ones(), 63);
    }

    #[test]
    fn test_shift_in_drops_oldest() {
        let mut b = bits("110");
        b.shift_in(false);
        assert_eq!(b.to_string(), "011");
        b.shift_in(true);
        assert_eq!(b.to_string(), "101");

        let mut empty = Bits::new(0);
        empty.shift_in(true);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_shift_in_carries_between_words() {
        let mut b = Bits::new(70);
        b.set(63, true);
        b.shift_in(false);
        assert!(b.get(64));
        assert!(!b.get(63));
        assert_eq!(b.count_ones(), 1);
    }

    #[test]
    fn test_append_unaligned() {
        let mut long = Bits::new(0);
        let mut expected = String::new();
        for i in 0..150 {
            let piece = if i % 3 == 0 { "101" } else { "0" };
            long.append(&bits(piece));
            expected.push_str(piece);
        }
        assert_eq!(long.to_string(), expected);
        assert_eq!(long.count_ones(), expected.matches('1').count());
    }

    #[test]
    fn test_drop_front_and_truncate() {
        let text: String = (0..130).map(|i| if i % 7 == 0 { '1' } else { '0' }).collect();
        let b = bits(&text);

        assert_eq!(b.drop_front(5).to_string(), &text[5..]);
        assert_eq!(b.drop_front(64).to_string(), &text[64..]);
        assert_eq!(b.drop_front(130).len(), 0);
        assert_eq!(b.truncated(70).to_string(), &text[..70]);
        assert_eq!(b.truncated(0).len(), 0);
    }

    #[test]
    fn test_and_not_counts() {
        let a = bits("1100");
        let b = bits("1010");
        assert_eq!((&a & &b).to_string(), "1000");
        assert_eq!((!&a).to_string(), "0011");
        assert_eq!((&!&a & &!&b).count_ones(), 1);
        assert_eq!((!&Bits::new(65)).count_ones(), 65);
    }

    #[test]
    fn test_serde_as_string() {
        let b = bits("0110");
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "\"0110\"");
        let back: Bits = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }
}
