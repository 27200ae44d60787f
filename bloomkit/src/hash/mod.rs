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

//! Hash functions consumed by the Bloom filter.
//!
//! A filter never hashes values itself: it asks a caller-supplied [`HashFunction`] for a
//! signed 128-bit hash and derives all of its bit positions from that one value. The filter
//! holds the hash function behind an [`Arc`](std::sync::Arc) so several filters can share it,
//! and two filters are only combinable when they share the same function.
//!
//! Three implementations are provided:
//!
//! - [`Murmur3`]: MurmurHash3 x64/128 over a fixed little-endian encoding of the value, so
//!   integers and lengths hash the same on every platform. The default.
//! - [`StdHash`]: the standard library's SipHash, widened from 64 to 128 bits. Fast, but its
//!   output may change between Rust releases, so do not persist filters built with it.
//! - [`HashFn`]: wraps a closure over the canonical byte encoding of a value.

mod func;
mod murmur;
mod sip;

use std::hash::Hash;
use std::hash::Hasher;

pub use self::func::HashFn;
pub use self::func::canonical_bytes;
pub use self::murmur::DEFAULT_SEED;
pub use self::murmur::Murmur3;
pub use self::sip::StdHash;
use crate::error::Error;

/// A function mapping any hashable value to a signed 128-bit integer.
///
/// Implementations must be deterministic: the same value must always produce the same hash,
/// otherwise previously inserted values stop being found.
pub trait HashFunction {
    /// Hashes `value` to a signed 128-bit integer.
    ///
    /// # Errors
    ///
    /// Returns an error (conventionally of kind
    /// [`HashFunctionFailure`](crate::error::ErrorKind::HashFunctionFailure)) if the value
    /// cannot be hashed. The filter propagates it unchanged.
    fn hash_one<T: Hash + ?Sized>(&self, value: &T) -> Result<i128, Error>;

    /// Returns whether `other` computes the same function as `self`.
    ///
    /// Filters compare hash functions by identity first; this is the caller-defined
    /// value-equality fallback. The default only trusts identity.
    fn same_as(&self, _other: &Self) -> bool {
        false
    }
}

/// Feeds integers to the wrapped [`Hasher`] in a platform-independent layout.
///
/// Integers are written little-endian and `usize`/`isize` (including the length prefixes of
/// slices and strings) are widened to 64 bits. Raw byte writes pass through unchanged.
pub(crate) struct FixedLayout<H>(pub(crate) H);

impl<H: Hasher> Hasher for FixedLayout<H> {
    fn finish(&self) -> u64 {
        self.0.finish()
    }

    fn write(&mut self, bytes: &[u8]) {
        self.0.write(bytes);
    }

    fn write_u16(&mut self, n: u16) {
        self.0.write(&n.to_le_bytes());
    }

    fn write_u32(&mut self, n: u32) {
        self.0.write(&n.to_le_bytes());
    }

    fn write_u64(&mut self, n: u64) {
        self.0.write(&n.to_le_bytes());
    }

    fn write_u128(&mut self, n: u128) {
        self.0.write(&n.to_le_bytes());
    }

    fn write_usize(&mut self, n: usize) {
        self.0.write(&(n as u64).to_le_bytes());
    }

    fn write_i16(&mut self, n: i16) {
        self.write_u16(n as u16);
    }

    fn write_i32(&mut self, n: i32) {
        self.write_u32(n as u32);
    }

    fn write_i64(&mut self, n: i64) {
        self.write_u64(n as u64);
    }

    fn write_i128(&mut self, n: i128) {
        self.write_u128(n as u128);
    }

    fn write_isize(&mut self, n: isize) {
        self.write_usize(n as usize);
    }
}

/// Joins two 64-bit halves into the signed 128-bit hash domain.
#[inline]
pub fn join_halves(high: u64, low: u64) -> i128 {
    (((high as u128) << 64) | low as u128) as i128
}

/// Splits a 128-bit hash into its high and low 64-bit halves.
#[inline]
pub fn split_halves(hash: i128) -> (u64, u64) {
    let bits = hash as u128;
    ((bits >> 64) as u64, bits as u64)
}

/// Normalizes a 64-bit hash into the 128-bit domain.
///
/// The high half is the hash itself and the low half is a SplitMix64 finalization of it, so
/// the two halves used for double hashing are never trivially related.
pub fn widen_u64(hash: u64) -> i128 {
    join_halves(hash, splitmix64(hash))
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_join_halves() {
        let hash = join_halves(0xdead_beef_0000_0001, 0x0123_4567_89ab_cdef);
        assert_eq!(split_halves(hash), (0xdead_beef_0000_0001, 0x0123_4567_89ab_cdef));

        // negative values keep their bit pattern
        assert_eq!(split_halves(-1), (u64::MAX, u64::MAX));
        assert_eq!(split_halves(i128::MIN), (1 << 63, 0));
    }

    #[test]
    fn test_fixed_layout_is_little_endian() {
        #[derive(Default)]
        struct Collect(Vec<u8>);

        impl Hasher for Collect {
            fn finish(&self) -> u64 {
                0
            }

            fn write(&mut self, bytes: &[u8]) {
                self.0.extend_from_slice(bytes);
            }
        }

        let mut hasher = FixedLayout(Collect::default());
        0x0102_0304_u32.hash(&mut hasher);
        (-2_i16).hash(&mut hasher);
        3_usize.hash(&mut hasher);
        assert_eq!(
            hasher.0.0,
            vec![4, 3, 2, 1, 0xfe, 0xff, 3, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_widen_u64() {
        let (high, low) = split_halves(widen_u64(42));
        assert_eq!(high, 42);
        assert_ne!(low, 42);
        assert_eq!(widen_u64(42), widen_u64(42));
        assert_ne!(widen_u64(42), widen_u64(43));
    }
}
