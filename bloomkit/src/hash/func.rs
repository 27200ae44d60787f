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

use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;

use crate::error::Error;
use crate::hash::FixedLayout;
use crate::hash::HashFunction;

/// A caller-supplied hash function over the canonical byte encoding of a value.
///
/// Values are first normalized by [`canonical_bytes`]; the closure then maps those bytes to
/// a signed 128-bit integer, or fails with an error that the filter propagates unchanged.
///
/// Closures have no notion of equality, so filters only treat two `HashFn`s as the same
/// function when they share one `Arc`.
///
/// # Examples
///
/// ```
/// # use std::sync::Arc;
/// # use bloomkit::bloom::BloomFilterBuilder;
/// # use bloomkit::hash::HashFn;
/// let hash = Arc::new(HashFn::new(|bytes: &[u8]| {
///     let (h1, h2) = mur3::murmurhash3_x64_128(bytes, 0);
///     Ok(bloomkit::hash::join_halves(h1, h2))
/// }));
///
/// let mut a = BloomFilterBuilder::with_accuracy(1000, 0.01)
///     .shared_hash_func(hash.clone())
///     .build()
///     .unwrap();
/// let b = BloomFilterBuilder::with_accuracy(1000, 0.01)
///     .shared_hash_func(hash)
///     .build()
///     .unwrap();
///
/// a.insert("foo").unwrap();
/// assert!(b.is_subset(&a).unwrap());
/// ```
pub struct HashFn<F> {
    func: F,
}

impl<F> HashFn<F>
where
    F: Fn(&[u8]) -> Result<i128, Error>,
{
    /// Wraps a closure as a hash function.
    pub fn new(func: F) -> Self {
        HashFn { func }
    }
}

impl<F> HashFunction for HashFn<F>
where
    F: Fn(&[u8]) -> Result<i128, Error>,
{
    fn hash_one<T: Hash + ?Sized>(&self, value: &T) -> Result<i128, Error> {
        let bytes = canonical_bytes(value);
        (self.func)(&bytes)
    }
}

impl<F> fmt::Debug for HashFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashFn").finish_non_exhaustive()
    }
}

/// Returns the byte sequence a value feeds into a [`Hasher`].
///
/// This is the normalization step applied before a [`HashFn`] sees a value: every `Hash`
/// type reduces to the bytes its `hash` implementation writes. Integers are encoded
/// little-endian and lengths as 64-bit integers, so the encoding does not depend on the
/// platform. Compound types follow their `Hash` implementations.
///
/// # Examples
///
/// ```
/// # use bloomkit::hash::canonical_bytes;
/// assert_eq!(canonical_bytes(&1u32), vec![1, 0, 0, 0]);
/// assert_ne!(canonical_bytes("ab"), canonical_bytes("a"));
/// ```
pub fn canonical_bytes<T: Hash + ?Sized>(value: &T) -> Vec<u8> {
    let mut sink = FixedLayout(ByteSink::default());
    value.hash(&mut sink);
    sink.0.bytes
}

#[derive(Default)]
struct ByteSink {
    bytes: Vec<u8>,
}

impl Hasher for ByteSink {
    fn finish(&self) -> u64 {
        0
    }

    fn write(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }
}
