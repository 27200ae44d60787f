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

use std::hash::Hash;

use crate::error::Error;
use crate::hash::FixedLayout;
use crate::hash::HashFunction;
use crate::hash::join_halves;

/// The seed used by [`Murmur3::default`].
pub const DEFAULT_SEED: u32 = 9001;

/// MurmurHash3 x64/128 over the value's [`Hash`] encoding.
///
/// Integers are fed little-endian and lengths as 64-bit values, so hashes agree across
/// platforms. Compound values hash through their own `Hash` impls, which std does not
/// guarantee across Rust releases; persisted filters are safest keyed by strings, byte
/// slices and integers.
///
/// Two instances with the same seed are the same function, so filters built from separate
/// `Murmur3` values with equal seeds can still be combined.
///
/// # Examples
///
/// ```
/// # use bloomkit::hash::HashFunction;
/// # use bloomkit::hash::Murmur3;
/// let hasher = Murmur3::with_seed(7);
/// assert_eq!(hasher.hash_one("foo").unwrap(), hasher.hash_one("foo").unwrap());
/// assert!(hasher.same_as(&Murmur3::with_seed(7)));
/// assert!(!hasher.same_as(&Murmur3::default()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Murmur3 {
    seed: u32,
}

impl Murmur3 {
    /// Creates a MurmurHash3 function with the given seed.
    pub fn with_seed(seed: u32) -> Self {
        Murmur3 { seed }
    }

    /// Returns the seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl Default for Murmur3 {
    fn default() -> Self {
        Murmur3::with_seed(DEFAULT_SEED)
    }
}

impl HashFunction for Murmur3 {
    fn hash_one<T: Hash + ?Sized>(&self, value: &T) -> Result<i128, Error> {
        let mut hasher = FixedLayout(mur3::Hasher128::with_seed(self.seed));
        value.hash(&mut hasher);
        let (lo, hi) = hasher.0.finish128();
        Ok(join_halves(hi, lo))
    }

    fn same_as(&self, other: &Self) -> bool {
        self == other
    }
}

#[cfg(test)]
mod tests {
    use std::hash::Hasher;

    use super::*;
    use crate::hash::split_halves;

    #[test]
    fn test_matches_reference_halves() {
        let mut hasher = mur3::Hasher128::with_seed(DEFAULT_SEED);
        "foo".hash(&mut hasher);
        let (lo, hi) = hasher.finish128();

        let hash = Murmur3::default().hash_one("foo").unwrap();
        assert_eq!(split_halves(hash), (hi, lo));
    }

    #[test]
    fn test_integers_hash_little_endian() {
        let mut hasher = mur3::Hasher128::with_seed(DEFAULT_SEED);
        hasher.write(&[4, 3, 2, 1]);
        let (lo, hi) = hasher.finish128();

        let hash = Murmur3::default().hash_one(&0x0102_0304_u32).unwrap();
        assert_eq!(split_halves(hash), (hi, lo));
    }

    #[test]
    fn test_seed_changes_hash() {
        let a = Murmur3::with_seed(1).hash_one(&42_u64).unwrap();
        let b = Murmur3::with_seed(2).hash_one(&42_u64).unwrap();
        assert_ne!(a, b);
    }
}
