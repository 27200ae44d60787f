// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::error::Error;

const WORD_BITS: u64 = 64;

/// A fixed-length sequence of bits packed into `u64` words.
///
/// Bits past `num_bits` in the last word are always zero, so word-wise equality, population
/// count and subset checks never see stray bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitArray {
    num_bits: u64,
    words: Vec<u64>,
}

impl BitArray {
    /// Creates an array of `num_bits` zero bits.
    pub fn new(num_bits: u64) -> Self {
        let num_words = num_bits.div_ceil(WORD_BITS) as usize;
        BitArray {
            num_bits,
            words: vec![0u64; num_words],
        }
    }

    /// Returns the number of bits in the array.
    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    /// Returns the value of the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= num_bits`.
    #[inline]
    pub fn get(&self, index: u64) -> bool {
        assert!(index < self.num_bits, "bit index {index} out of range");
        let mask = 1u64 << (index % WORD_BITS);
        (self.words[(index / WORD_BITS) as usize] & mask) != 0
    }

    /// Sets the bit at `index`, returning whether it was previously unset.
    ///
    /// # Panics
    ///
    /// Panics if `index >= num_bits`.
    #[inline]
    pub fn set(&mut self, index: u64) -> bool {
        assert!(index < self.num_bits, "bit index {index} out of range");
        let mask = 1u64 << (index % WORD_BITS);
        let word = &mut self.words[(index / WORD_BITS) as usize];
        let was_unset = (*word & mask) == 0;
        *word |= mask;
        was_unset
    }

    /// Returns the number of bits set to 1.
    pub fn count_ones(&self) -> u64 {
        self.words.iter().map(|word| word.count_ones() as u64).sum()
    }

    /// Returns whether no bit is set.
    pub fn is_clear(&self) -> bool {
        self.words.iter().all(|&word| word == 0)
    }

    /// Resets every bit to 0.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Sets every bit to 1.
    pub fn fill(&mut self) {
        self.words.fill(u64::MAX);
        self.mask_tail();
    }

    /// ORs `other` into `self`.
    ///
    /// # Panics
    ///
    /// Panics if the arrays differ in length.
    pub fn union_with(&mut self, other: &BitArray) {
        self.assert_same_len(other);
        for (word, other_word) in self.words.iter_mut().zip(&other.words) {
            *word |= *other_word;
        }
    }

    /// ANDs `other` into `self`.
    ///
    /// # Panics
    ///
    /// Panics if the arrays differ in length.
    pub fn intersect_with(&mut self, other: &BitArray) {
        self.assert_same_len(other);
        for (word, other_word) in self.words.iter_mut().zip(&other.words) {
            *word &= *other_word;
        }
    }

    /// Returns the bitwise OR of `self` and `other`.
    pub fn union(&self, other: &BitArray) -> BitArray {
        let mut result = self.clone();
        result.union_with(other);
        result
    }

    /// Returns the bitwise AND of `self` and `other`.
    pub fn intersection(&self, other: &BitArray) -> BitArray {
        let mut result = self.clone();
        result.intersect_with(other);
        result
    }

    /// Returns whether every bit set in `self` is also set in `other`.
    ///
    /// # Panics
    ///
    /// Panics if the arrays differ in length.
    pub fn is_subset_of(&self, other: &BitArray) -> bool {
        self.assert_same_len(other);
        self.words
            .iter()
            .zip(&other.words)
            .all(|(word, other_word)| word & other_word == *word)
    }

    /// Packs the bits into `ceil(num_bits / 8)` bytes; bit `i` lands in byte `i / 8` at
    /// position `i % 8`, and padding bits of the last byte are zero.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let num_bytes = self.num_bits.div_ceil(8) as usize;
        self.words
            .iter()
            .flat_map(|word| word.to_le_bytes())
            .take(num_bytes)
            .collect()
    }

    /// Rebuilds an array of `num_bits` bits from the layout produced by
    /// [`to_le_bytes`](Self::to_le_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`CorruptData`](crate::error::ErrorKind::CorruptData) if `bytes` is not exactly
    /// `ceil(num_bits / 8)` long or if any padding bit is set.
    pub fn from_le_bytes(num_bits: u64, bytes: &[u8]) -> Result<Self, Error> {
        let expected = num_bits.div_ceil(8);
        if bytes.len() as u64 != expected {
            return Err(Error::corrupt(format!(
                "bit array of {num_bits} bits needs {expected} bytes, got {}",
                bytes.len()
            )));
        }

        let mut array = BitArray::new(num_bits);
        for (word, chunk) in array.words.iter_mut().zip(bytes.chunks(8)) {
            let mut buf = [0u8; 8];
            buf[..chunk.len()].copy_from_slice(chunk);
            *word = u64::from_le_bytes(buf);
        }

        let before = array.count_ones();
        array.mask_tail();
        if array.count_ones() != before {
            return Err(Error::corrupt("padding bits after the last bit are set"));
        }
        Ok(array)
    }

    fn mask_tail(&mut self) {
        let excess_bits = self.num_bits % WORD_BITS;
        if excess_bits != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << excess_bits) - 1;
            }
        }
    }

    fn assert_same_len(&self, other: &BitArray) {
        assert_eq!(
            self.num_bits, other.num_bits,
            "bit arrays must have the same length"
        );
    }
}
