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

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::bloom::BitArray;
use crate::bloom::BitIndices;
use crate::bloom::BloomFilterBuilder;
use crate::bloom::params::validate_size;
use crate::error::Error;
use crate::hash::HashFunction;
use crate::hash::Murmur3;

/// A Bloom filter for probabilistic set membership testing.
///
/// Provides fast membership queries with:
/// - No false negatives (inserted items always return `true`)
/// - Tunable false positive rate
/// - Constant space usage
///
/// The filter owns its bits and shares its hash function through an [`Arc`]. Cloning copies
/// the bits and shares the hash function.
///
/// Mutation takes `&mut self`, so concurrent writers must be serialized by the caller;
/// concurrent readers are fine whenever `H: Sync`.
///
/// Use [`BloomFilterBuilder`] to construct instances.
#[derive(Debug)]
pub struct BloomFilter<H = Murmur3> {
    /// Number of hash rounds per item (k)
    hash_rounds: u64,
    /// Bit array of `size_in_bits` bits (m)
    bits: BitArray,
    /// Caller-supplied hash function, shared with other filters
    hash_func: Arc<H>,
}

impl BloomFilter<Murmur3> {
    /// Returns a builder for creating a Bloom filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomkit::bloom::BloomFilter;
    ///
    /// // By accuracy (recommended)
    /// let filter = BloomFilter::builder(1000, 0.01).build().unwrap();
    /// assert_eq!(filter.hash_rounds(), 7);
    /// ```
    pub fn builder(expected_items: u64, fpp: f64) -> BloomFilterBuilder<Murmur3> {
        BloomFilterBuilder::with_accuracy(expected_items, fpp)
    }

    /// Creates a filter for `expected_items` at false positive rate `fpp` hashed with
    /// [`Murmur3::default()`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameter`](crate::error::ErrorKind::InvalidParameter) if
    /// `expected_items` is 0 or `fpp` is not in (0, 1).
    pub fn new(expected_items: u64, fpp: f64) -> Result<Self, Error> {
        BloomFilterBuilder::with_accuracy(expected_items, fpp).build()
    }
}

impl<H> BloomFilter<H> {
    /// Assembles a filter from raw parts, as the load path does.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameter`](crate::error::ErrorKind::InvalidParameter) if `bits` is
    /// empty or too large, or if `hash_rounds` is 0.
    pub fn from_parts(hash_rounds: u64, bits: BitArray, hash_func: Arc<H>) -> Result<Self, Error> {
        validate_size(bits.num_bits(), hash_rounds)?;
        Ok(BloomFilter {
            hash_rounds,
            bits,
            hash_func,
        })
    }

    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns the total number of bits in the filter (m).
    pub fn size_in_bits(&self) -> u64 {
        self.bits.num_bits()
    }

    /// Returns the number of hash rounds per item (k).
    pub fn hash_rounds(&self) -> u64 {
        self.hash_rounds
    }

    /// Returns the shared hash function.
    pub fn hash_func(&self) -> &Arc<H> {
        &self.hash_func
    }

    /// Returns the underlying bit array.
    pub fn bit_array(&self) -> &BitArray {
        &self.bits
    }

    /// Returns whether no item has been inserted.
    pub fn is_empty(&self) -> bool {
        self.bits.is_clear()
    }

    /// Returns the number of bits set to 1.
    pub fn bits_set(&self) -> u64 {
        self.bits.count_ones()
    }

    /// Returns the fraction of bits set.
    pub fn load_factor(&self) -> f64 {
        self.bits_set() as f64 / self.size_in_bits() as f64
    }

    /// Estimates the current false positive probability as `load_factor ^ k`.
    pub fn estimated_fpp(&self) -> f64 {
        self.load_factor().powf(self.hash_rounds as f64)
    }

    /// Estimates the number of distinct items inserted.
    ///
    /// With `X` bits set this is `-(m / k) * ln(1 - X / m)`, and exactly `0.0` for an empty
    /// filter. A saturated filter (every bit set) has no finite estimate; it reports
    /// `(m / k) * max(1, ln(m))`, the same value as a filter with one bit left unset, which is
    /// always at least `m / k`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(1000, 0.01).unwrap();
    /// assert_eq!(filter.approx_items(), 0.0);
    ///
    /// filter.update(0..100).unwrap();
    /// let estimate = filter.approx_items();
    /// assert!((estimate - 100.0).abs() < 10.0, "estimate was {estimate}");
    /// ```
    pub fn approx_items(&self) -> f64 {
        let x = self.bits_set();
        if x == 0 {
            return 0.0;
        }

        let m = self.size_in_bits() as f64;
        let k = self.hash_rounds as f64;
        if x >= self.size_in_bits() {
            return (m / k) * m.ln().max(1.0);
        }
        -(m / k) * (1.0 - x as f64 / m).ln()
    }

    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Resets every bit to 0, keeping the size and hash function.
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Calls `visit` with every reference this filter shares but does not own exclusively.
    ///
    /// A filter's only shared reference is its hash function. Hosts that track reference
    /// cycles (for example a hash function closure that refers back to the filter) use this
    /// to enumerate the edges out of a filter; the filter itself never collects cycles.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use bloomkit::bloom::BloomFilter;
    /// let filter = BloomFilter::new(1000, 0.1).unwrap();
    /// let mut seen = vec![];
    /// filter.traverse(|hash_func| seen.push(Arc::clone(hash_func)));
    /// assert_eq!(seen.len(), 1);
    /// assert!(Arc::ptr_eq(&seen[0], filter.hash_func()));
    /// ```
    pub fn traverse<F: FnMut(&Arc<H>)>(&self, mut visit: F) {
        visit(&self.hash_func);
    }

    pub(crate) fn bits_mut(&mut self) -> &mut BitArray {
        &mut self.bits
    }

    pub(crate) fn indices(&self, hash: i128) -> BitIndices {
        BitIndices::new(hash, self.size_in_bits(), self.hash_rounds)
    }
}

impl<H: HashFunction> BloomFilter<H> {
    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Tests whether an item is possibly in the set.
    ///
    /// Returns:
    /// - `true`: Item was **possibly** inserted (or false positive)
    /// - `false`: Item was **definitely not** inserted
    ///
    /// # Errors
    ///
    /// Propagates the hash function's error.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(100, 0.01).unwrap();
    /// filter.insert("apple").unwrap();
    ///
    /// assert!(filter.contains("apple").unwrap()); // true - was inserted
    /// assert!(!filter.contains("grape").unwrap()); // false - never inserted (probably)
    /// ```
    pub fn contains<T: Hash + ?Sized>(&self, item: &T) -> Result<bool, Error> {
        let hash = self.hash_func.hash_one(item)?;
        Ok(self.indices(hash).all(|index| self.bits.get(index)))
    }

    /// Inserts an item into the filter.
    ///
    /// After insertion, `contains(item)` will always return `true`. Inserting the same item
    /// again changes nothing.
    ///
    /// # Errors
    ///
    /// Propagates the hash function's error; the filter is left unchanged.
    pub fn insert<T: Hash + ?Sized>(&mut self, item: &T) -> Result<(), Error> {
        let hash = self.hash_func.hash_one(item)?;
        for index in self.indices(hash) {
            self.bits.set(index);
        }
        Ok(())
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    /// Checks if two filters can be combined or compared.
    ///
    /// Filters are compatible if they have the same size and number of hash rounds and share
    /// the same hash function, either the same `Arc` or functions that report
    /// [`same_as`](HashFunction::same_as) each other.
    pub fn is_compatible(&self, other: &BloomFilter<H>) -> bool {
        self.size_in_bits() == other.size_in_bits()
            && self.hash_rounds == other.hash_rounds
            && (Arc::ptr_eq(&self.hash_func, &other.hash_func)
                || self.hash_func.same_as(&other.hash_func))
    }

    pub(crate) fn check_compatible(&self, other: &BloomFilter<H>) -> Result<(), Error> {
        if self.is_compatible(other) {
            return Ok(());
        }

        log::warn!(
            "rejecting incompatible bloom filter: size_in_bits {} vs {}, hash_rounds {} vs {}",
            self.size_in_bits(),
            other.size_in_bits(),
            self.hash_rounds,
            other.hash_rounds
        );
        Err(Error::incompatible(
            "filters must have the same size, hash rounds and hash function",
        )
        .with_context("size_in_bits", self.size_in_bits())
        .with_context("other_size_in_bits", other.size_in_bits())
        .with_context("hash_rounds", self.hash_rounds)
        .with_context("other_hash_rounds", other.hash_rounds))
    }

    /// Returns whether every bit set in `self` is also set in `other`.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleFilter`](crate::error::ErrorKind::IncompatibleFilter) if the
    /// filters are not compatible.
    pub fn is_subset(&self, other: &BloomFilter<H>) -> Result<bool, Error> {
        self.check_compatible(other)?;
        Ok(self.bits.is_subset_of(&other.bits))
    }

    /// Returns whether every bit set in `other` is also set in `self`.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleFilter`](crate::error::ErrorKind::IncompatibleFilter) if the
    /// filters are not compatible.
    pub fn is_superset(&self, other: &BloomFilter<H>) -> Result<bool, Error> {
        other.is_subset(self)
    }

    /// Returns whether `self` is a subset of `other` and not equal to it.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleFilter`](crate::error::ErrorKind::IncompatibleFilter) if the
    /// filters are not compatible.
    pub fn is_strict_subset(&self, other: &BloomFilter<H>) -> Result<bool, Error> {
        Ok(self.is_subset(other)? && self.bits != other.bits)
    }

    /// Returns whether `self` is a superset of `other` and not equal to it.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleFilter`](crate::error::ErrorKind::IncompatibleFilter) if the
    /// filters are not compatible.
    pub fn is_strict_superset(&self, other: &BloomFilter<H>) -> Result<bool, Error> {
        other.is_strict_subset(self)
    }
}

impl<H> Clone for BloomFilter<H> {
    fn clone(&self) -> Self {
        BloomFilter {
            hash_rounds: self.hash_rounds,
            bits: self.bits.clone(),
            hash_func: Arc::clone(&self.hash_func),
        }
    }
}

/// Two filters are equal when they are compatible and have the same bits set.
impl<H: HashFunction> PartialEq for BloomFilter<H> {
    fn eq(&self, other: &Self) -> bool {
        self.is_compatible(other) && self.bits == other.bits
    }
}

/// Filters are partially ordered by bit-subset.
///
/// `a <= b` holds when `a` is a subset of `b`; incompatible or incomparable filters return
/// `None`, so both `a < b` and `a > b` are false for them.
impl<H: HashFunction> PartialOrd for BloomFilter<H> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if !self.is_compatible(other) {
            return None;
        }
        if self.bits == other.bits {
            Some(Ordering::Equal)
        } else if self.bits.is_subset_of(&other.bits) {
            Some(Ordering::Less)
        } else if other.bits.is_subset_of(&self.bits) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

impl<H> fmt::Display for BloomFilter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<BloomFilter size_in_bits={} approx_items={:?}>",
            self.size_in_bits(),
            self.approx_items()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::hash::HashFn;
    use crate::hash::StdHash;

    #[test]
    fn test_insert_and_contains() {
        let mut filter = BloomFilter::new(100, 0.01).unwrap();

        assert!(!filter.contains("apple").unwrap());
        filter.insert("apple").unwrap();
        assert!(filter.contains("apple").unwrap());
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut filter = BloomFilter::new(100, 0.01).unwrap();
        filter.insert(&42_u64).unwrap();
        let once = filter.clone();
        filter.insert(&42_u64).unwrap();
        assert_eq!(filter, once);
        assert_eq!(filter.bits_set(), once.bits_set());
    }

    #[test]
    fn test_clear() {
        let mut filter = BloomFilter::new(100, 0.01).unwrap();
        filter.insert("test").unwrap();
        assert!(!filter.is_empty());

        filter.clear();
        assert!(filter.is_empty());
        assert!(!filter.contains("test").unwrap());
        assert_eq!(filter.approx_items(), 0.0);
        assert_eq!(filter.size_in_bits(), 952);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut filter = BloomFilter::new(100, 0.01).unwrap();
        filter.insert("a").unwrap();

        let mut copy = filter.clone();
        assert_eq!(copy, filter);
        assert!(Arc::ptr_eq(copy.hash_func(), filter.hash_func()));

        copy.insert("b").unwrap();
        assert!(!filter.contains("b").unwrap());
        assert_ne!(copy, filter);
    }

    #[test]
    fn test_statistics() {
        let mut filter = BloomFilterBuilder::with_size(1000, 5).build().unwrap();
        assert_eq!(filter.bits_set(), 0);
        assert_eq!(filter.load_factor(), 0.0);
        assert_eq!(filter.estimated_fpp(), 0.0);

        filter.insert("test").unwrap();
        assert!(filter.bits_set() > 0 && filter.bits_set() <= 5);
        assert!(filter.load_factor() > 0.0);
        assert!(filter.estimated_fpp() > 0.0);
    }

    #[test]
    fn test_approx_items_saturated_is_finite() {
        let mut bits = BitArray::new(64);
        bits.fill();
        let filter = BloomFilter::from_parts(4, bits, Arc::new(Murmur3::default())).unwrap();

        let estimate = filter.approx_items();
        assert!(estimate.is_finite());
        assert!(estimate >= 64.0 / 4.0);
    }

    #[test]
    fn test_from_parts_validates() {
        let err = BloomFilter::from_parts(0, BitArray::new(64), Arc::new(StdHash)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        let err = BloomFilter::from_parts(3, BitArray::new(0), Arc::new(StdHash)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_is_compatible() {
        let f1 = BloomFilter::new(100, 0.01).unwrap();
        let f2 = BloomFilter::new(100, 0.01).unwrap();
        let f3 = BloomFilterBuilder::with_accuracy(100, 0.01)
            .hash_func(Murmur3::with_seed(456))
            .build()
            .unwrap();
        let f4 = BloomFilter::new(100, 0.02).unwrap();

        assert!(f1.is_compatible(&f2));
        assert!(!f1.is_compatible(&f3));
        assert!(!f1.is_compatible(&f4));
    }

    #[test]
    fn test_closure_hash_compatible_only_by_identity() {
        type PlainFn = fn(&[u8]) -> Result<i128, Error>;
        fn by_len(bytes: &[u8]) -> Result<i128, Error> {
            Ok(bytes.len() as i128)
        }

        let hash = Arc::new(HashFn::new(by_len as PlainFn));
        let a = BloomFilterBuilder::with_accuracy(100, 0.01)
            .shared_hash_func(hash.clone())
            .build()
            .unwrap();
        let b = BloomFilterBuilder::with_accuracy(100, 0.01)
            .shared_hash_func(hash)
            .build()
            .unwrap();
        assert!(a.is_compatible(&b));

        let c = BloomFilterBuilder::with_accuracy(100, 0.01)
            .hash_func(HashFn::new(by_len as PlainFn))
            .build()
            .unwrap();
        assert!(!a.is_compatible(&c));
    }

    #[test]
    fn test_hash_failure_leaves_filter_unchanged() {
        let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01)
            .hash_func(HashFn::new(|bytes: &[u8]| {
                if bytes.first() == Some(&b'!') {
                    Err(Error::hash_function_failure("unhashable"))
                } else {
                    let (h1, h2) = mur3::murmurhash3_x64_128(bytes, 0);
                    Ok(crate::hash::join_halves(h1, h2))
                }
            }))
            .build()
            .unwrap();

        filter.insert("ok").unwrap();
        let before = filter.clone();
        let err = filter.insert("!bad").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HashFunctionFailure);
        assert_eq!(filter, before);
        assert_eq!(
            filter.contains("!bad").unwrap_err().kind(),
            ErrorKind::HashFunctionFailure
        );
    }

    #[test]
    fn test_ordering_is_partial() {
        let mut a = BloomFilter::new(1000, 0.01).unwrap();
        let mut b = BloomFilter::new(1000, 0.01).unwrap();
        a.insert("a").unwrap();
        b.insert("b").unwrap();

        assert_eq!(a.partial_cmp(&b), None);
        let (less, greater) = (a < b, a > b);
        assert!(!less && !greater);

        let mut both = a.clone();
        both.insert("b").unwrap();
        assert!(a < both);
        assert!(both > a);

        let same = a.clone();
        assert!(a <= same && a >= same);
        let less = a < same;
        assert!(!less);
        assert!(a.is_subset(&a).unwrap());
        assert!(a.is_strict_subset(&both).unwrap());
        assert!(both.is_strict_superset(&a).unwrap());
        assert!(!a.is_strict_subset(&a).unwrap());
    }

    #[test]
    fn test_comparing_incompatible_filters() {
        let a = BloomFilter::new(1000, 0.01).unwrap();
        let b = BloomFilter::new(1000, 0.05).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.partial_cmp(&b), None);
        assert_eq!(a.is_subset(&b).unwrap_err().kind(), ErrorKind::IncompatibleFilter);
        assert_eq!(a.is_superset(&b).unwrap_err().kind(), ErrorKind::IncompatibleFilter);
    }

    #[test]
    fn test_display() {
        let filter = BloomFilter::new(27_000, 0.0317).unwrap();
        assert_eq!(
            filter.to_string(),
            "<BloomFilter size_in_bits=193960 approx_items=0.0>"
        );
    }

    #[test]
    fn test_traverse_and_release() {
        let hash = Arc::new(StdHash);
        let filter = BloomFilterBuilder::with_accuracy(1000, 0.1)
            .shared_hash_func(hash.clone())
            .build()
            .unwrap();
        assert_eq!(Arc::strong_count(&hash), 2);

        let mut visited = 0;
        filter.traverse(|shared| {
            assert!(Arc::ptr_eq(shared, &hash));
            visited += 1;
        });
        assert_eq!(visited, 1);

        drop(filter);
        assert_eq!(Arc::strong_count(&hash), 1);
    }
}
