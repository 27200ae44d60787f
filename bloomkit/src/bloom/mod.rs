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

//! Bloom Filter implementation for probabilistic set membership testing.
//!
//! A Bloom filter is a space-efficient probabilistic data structure used to test whether
//! an element is a member of a set. False positive matches are possible, but false negatives
//! are not. In other words, a query returns either "possibly in set" or "definitely not in set".
//!
//! # Properties
//!
//! - **No false negatives**: If an item was inserted, `contains()` will always return `true`
//! - **Possible false positives**: `contains()` may return `true` for items never inserted
//! - **Fixed size**: Bloom filters never resize; combining filters of different sizes is an
//!   error
//! - **No deletion**: Items can be inserted, queried and merged, never removed
//!
//! # Usage
//!
//! ```rust
//! use bloomkit::bloom::BloomFilter;
//!
//! // Create a filter optimized for 27,000 items with a 3.17% false positive rate
//! let mut filter = BloomFilter::new(27_000, 0.0317).unwrap();
//! assert_eq!(filter.size_in_bits(), 193_960);
//! assert_eq!(filter.approx_items(), 0.0);
//!
//! // Insert items
//! filter.insert("foo").unwrap();
//! filter.insert("bar").unwrap();
//!
//! // Check membership
//! assert!(filter.contains("foo").unwrap()); // true - definitely inserted
//! assert!(!filter.contains("baz").unwrap()); // false - never inserted (probably)
//!
//! // Insert many at once
//! filter.update(["baz", "qux"]).unwrap();
//! assert!(filter.contains("baz").unwrap());
//!
//! println!("{filter}"); // <BloomFilter size_in_bits=193960 approx_items=4.0...>
//! ```
//!
//! # Creating Filters
//!
//! ## By Accuracy (Recommended)
//!
//! ```rust
//! # use bloomkit::bloom::BloomFilterBuilder;
//! # use bloomkit::hash::Murmur3;
//! let filter = BloomFilterBuilder::with_accuracy(
//!     10_000, // Expected items
//!     0.01,   // Target false positive probability (1%)
//! )
//! .hash_func(Murmur3::with_seed(42)) // Optional: custom hash function
//! .build()
//! .unwrap();
//! ```
//!
//! ## By Size (Manual)
//!
//! ```rust
//! # use bloomkit::bloom::BloomFilterBuilder;
//! let filter = BloomFilterBuilder::with_size(
//!     95_851, // Number of bits
//!     7,      // Number of hash rounds
//! )
//! .build()
//! .unwrap();
//! ```
//!
//! # Set Operations
//!
//! Filters sharing size, hash rounds and hash function combine bitwise. Filters are also
//! partially ordered by bit-subset, so `<`, `<=`, `>` and `>=` work:
//!
//! ```rust
//! # use bloomkit::bloom::BloomFilter;
//! let mut filter1 = BloomFilter::new(100, 0.01).unwrap();
//! let mut filter2 = BloomFilter::new(100, 0.01).unwrap();
//!
//! filter1.insert("a").unwrap();
//! filter2.insert("b").unwrap();
//!
//! // Union: recognizes items from either filter
//! let union = filter1.union(&[&filter2]).unwrap();
//! assert!(union.contains("a").unwrap());
//! assert!(union.contains("b").unwrap());
//! assert!(filter1 < union);
//!
//! // Intersect: recognizes only items in both filters
//! let intersection = filter1.intersection(&[&filter2]).unwrap();
//! assert!(intersection <= filter1 && intersection <= filter2);
//! ```
//!
//! # Implementation Details
//!
//! - One 128-bit hash per item from a caller-supplied [`HashFunction`](crate::hash::HashFunction)
//! - Double hashing (Kirsch-Mitzenmacher method) derives the k bit positions
//! - Bits packed in `u64` words
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/time trade-offs in hash coding with allowable errors"
//! - Kirsch and Mitzenmacher (2008). "Less Hashing, Same Performance: Building a Better Bloom
//!   Filter"

mod algebra;
mod bits;
mod filter;
mod index;
mod params;
mod serialization;

pub use self::algebra::SetBatch;
pub use self::bits::BitArray;
pub use self::filter::BloomFilter;
pub use self::index::BitIndices;
pub use self::params::BloomFilterBuilder;
pub use self::params::MAX_HASH_ROUNDS;
pub use self::params::MAX_NUM_BITS;
pub use self::params::optimal_params;
pub use self::params::suggest_hash_rounds;
pub use self::params::suggest_num_bits;
