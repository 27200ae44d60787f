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

use crate::bloom::BitArray;
use crate::bloom::BloomFilter;
use crate::error::Error;
use crate::hash::HashFunction;

// ============================================================================
// Set Operations
// ============================================================================

impl<H: HashFunction> BloomFilter<H> {
    /// Returns a new filter recognizing items from `self` or any of `others` (bitwise OR).
    ///
    /// `self` may appear among `others`; OR with itself changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleFilter`](crate::error::ErrorKind::IncompatibleFilter) if any
    /// operand differs in size, hash rounds or hash function.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let mut f1 = BloomFilter::new(100, 0.01).unwrap();
    /// let mut f2 = BloomFilter::new(100, 0.01).unwrap();
    ///
    /// f1.insert("a").unwrap();
    /// f2.insert("b").unwrap();
    ///
    /// let both = f1.union(&[&f2]).unwrap();
    /// assert!(both.contains("a").unwrap());
    /// assert!(both.contains("b").unwrap());
    /// ```
    pub fn union(&self, others: &[&BloomFilter<H>]) -> Result<BloomFilter<H>, Error> {
        let mut result = self.clone();
        result.union_update(others)?;
        Ok(result)
    }

    /// Returns a new filter recognizing only items in `self` and every one of `others`
    /// (bitwise AND), plus false positives.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleFilter`](crate::error::ErrorKind::IncompatibleFilter) if any
    /// operand differs in size, hash rounds or hash function.
    pub fn intersection(&self, others: &[&BloomFilter<H>]) -> Result<BloomFilter<H>, Error> {
        let mut result = self.clone();
        result.intersection_update(others)?;
        Ok(result)
    }

    /// Merges every filter in `others` into this one via bitwise OR.
    ///
    /// All operands are checked before any bit changes; on error `self` is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleFilter`](crate::error::ErrorKind::IncompatibleFilter) if any
    /// operand differs in size, hash rounds or hash function.
    pub fn union_update(&mut self, others: &[&BloomFilter<H>]) -> Result<(), Error> {
        self.check_all_compatible(others)?;
        for other in others {
            self.bits_mut().union_with(other.bit_array());
        }
        Ok(())
    }

    /// Intersects this filter with every filter in `others` via bitwise AND.
    ///
    /// All operands are checked before any bit changes; on error `self` is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleFilter`](crate::error::ErrorKind::IncompatibleFilter) if any
    /// operand differs in size, hash rounds or hash function.
    pub fn intersection_update(&mut self, others: &[&BloomFilter<H>]) -> Result<(), Error> {
        self.check_all_compatible(others)?;
        for other in others {
            self.bits_mut().intersect_with(other.bit_array());
        }
        Ok(())
    }

    /// Inserts every item of `items`.
    ///
    /// The items are hashed before the filter changes, so a hash function failure part way
    /// through leaves the filter as it was.
    ///
    /// # Errors
    ///
    /// Propagates the hash function's error.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(27_000, 0.0317).unwrap();
    /// filter.update(["baz", "qux"]).unwrap();
    /// assert!(filter.contains("baz").unwrap());
    /// assert!(filter.contains("qux").unwrap());
    /// ```
    pub fn update<I>(&mut self, items: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: Hash,
    {
        self.batch_update().items(items)?.apply();
        Ok(())
    }

    /// Starts a multi-source update: every source is ORed into this filter.
    ///
    /// Sources are added left to right with [`SetBatch::filter`] and [`SetBatch::items`] and
    /// take effect together on [`SetBatch::apply`]. Any error drops the batch before the
    /// filter changes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// # fn main() -> Result<(), bloomkit::error::Error> {
    /// let mut other = BloomFilter::new(1000, 0.01)?;
    /// other.insert("foo")?;
    ///
    /// let mut filter = BloomFilter::new(1000, 0.01)?;
    /// filter
    ///     .batch_update()
    ///     .filter(&other)?
    ///     .items(["bob"])?
    ///     .filter(&other)?
    ///     .apply();
    ///
    /// assert!(filter.contains("foo")?);
    /// assert!(filter.contains("bob")?);
    /// # Ok(())
    /// # }
    /// ```
    pub fn batch_update(&mut self) -> SetBatch<'_, H> {
        SetBatch::new(self, SetOp::Union)
    }

    /// Starts a multi-source intersection: this filter keeps only bits set in every source.
    ///
    /// A filter source contributes its bits; an item source contributes the bits of a
    /// temporary filter holding just those items.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// # fn main() -> Result<(), bloomkit::error::Error> {
    /// let mut filter = BloomFilter::new(1000, 0.1)?;
    /// filter.update(["foo", "bob"])?;
    ///
    /// let snapshot = filter.clone();
    /// filter
    ///     .batch_intersection_update()
    ///     .filter(&snapshot)?
    ///     .items(["foo"])?
    ///     .apply();
    ///
    /// assert!(filter.contains("foo")?);
    /// assert!(!filter.contains("bob")?);
    /// # Ok(())
    /// # }
    /// ```
    pub fn batch_intersection_update(&mut self) -> SetBatch<'_, H> {
        SetBatch::new(self, SetOp::Intersection)
    }

    fn check_all_compatible(&self, others: &[&BloomFilter<H>]) -> Result<(), Error> {
        others
            .iter()
            .try_for_each(|other| self.check_compatible(other))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetOp {
    Union,
    Intersection,
}

/// An in-progress multi-source update of a [`BloomFilter`].
///
/// Sources are folded into a staged bit array; the target filter is only written by
/// [`apply`](Self::apply). Created by [`BloomFilter::batch_update`] and
/// [`BloomFilter::batch_intersection_update`].
#[must_use = "a batch does nothing until `apply` is called"]
#[derive(Debug)]
pub struct SetBatch<'a, H> {
    target: &'a mut BloomFilter<H>,
    op: SetOp,
    staged: BitArray,
}

impl<'a, H: HashFunction> SetBatch<'a, H> {
    fn new(target: &'a mut BloomFilter<H>, op: SetOp) -> Self {
        let mut staged = BitArray::new(target.size_in_bits());
        if op == SetOp::Intersection {
            staged.fill();
        }
        SetBatch { target, op, staged }
    }

    /// Adds a filter source.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleFilter`](crate::error::ErrorKind::IncompatibleFilter) if
    /// `source` is not compatible with the target filter.
    pub fn filter(mut self, source: &BloomFilter<H>) -> Result<Self, Error> {
        self.target.check_compatible(source)?;
        match self.op {
            SetOp::Union => self.staged.union_with(source.bit_array()),
            SetOp::Intersection => self.staged.intersect_with(source.bit_array()),
        }
        Ok(self)
    }

    /// Adds a source of raw items, hashed with the target filter's hash function.
    ///
    /// # Errors
    ///
    /// Propagates the hash function's error.
    pub fn items<I>(mut self, items: I) -> Result<Self, Error>
    where
        I: IntoIterator,
        I::Item: Hash,
    {
        match self.op {
            SetOp::Union => {
                for item in items {
                    let hash = self.target.hash_func().hash_one(&item)?;
                    for index in self.target.indices(hash) {
                        self.staged.set(index);
                    }
                }
            }
            SetOp::Intersection => {
                let mut scratch = BitArray::new(self.staged.num_bits());
                for item in items {
                    let hash = self.target.hash_func().hash_one(&item)?;
                    for index in self.target.indices(hash) {
                        scratch.set(index);
                    }
                }
                self.staged.intersect_with(&scratch);
            }
        }
        Ok(self)
    }

    /// Writes the staged result into the target filter.
    pub fn apply(self) {
        match self.op {
            SetOp::Union => self.target.bits_mut().union_with(&self.staged),
            SetOp::Intersection => self.target.bits_mut().intersect_with(&self.staged),
        }
    }
}
