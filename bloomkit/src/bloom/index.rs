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

use std::iter::FusedIterator;

use crate::hash::split_halves;

/// The `k` bit positions derived from a single 128-bit hash.
///
/// Uses double hashing (Kirsch-Mitzenmacher): with `h1` the high and `h2` the low half of the
/// hash, round `i` yields `(h1 + i * h2) mod m` in wrapping unsigned 64-bit arithmetic.
/// Positions are not necessarily distinct.
#[derive(Debug, Clone)]
pub struct BitIndices {
    h1: u64,
    h2: u64,
    round: u64,
    num_rounds: u64,
    num_bits: u64,
}

impl BitIndices {
    /// Creates the index sequence for `hash` in a filter of `num_bits` bits with
    /// `num_rounds` hash rounds.
    ///
    /// # Panics
    ///
    /// Panics if `num_bits` is 0.
    pub fn new(hash: i128, num_bits: u64, num_rounds: u64) -> Self {
        assert!(num_bits > 0, "num_bits must be at least 1");
        let (h1, h2) = split_halves(hash);
        BitIndices {
            h1,
            h2,
            round: 0,
            num_rounds,
            num_bits,
        }
    }
}

impl Iterator for BitIndices {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<u64> {
        if self.round >= self.num_rounds {
            return None;
        }
        let hash = self.h1.wrapping_add(self.round.wrapping_mul(self.h2));
        self.round += 1;
        Some(hash % self.num_bits)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.num_rounds - self.round).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BitIndices {}

impl FusedIterator for BitIndices {}
