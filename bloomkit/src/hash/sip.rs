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

use std::hash::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use crate::error::Error;
use crate::hash::HashFunction;
use crate::hash::widen_u64;

/// The standard library's 64-bit SipHash, widened to 128 bits with [`widen_u64`].
///
/// Output is stable within one build but may change between Rust releases: filters built
/// with `StdHash` should not be persisted and reloaded by a different binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StdHash;

impl HashFunction for StdHash {
    fn hash_one<T: Hash + ?Sized>(&self, value: &T) -> Result<i128, Error> {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        Ok(widen_u64(hasher.finish()))
    }

    fn same_as(&self, _other: &Self) -> bool {
        true
    }
}
