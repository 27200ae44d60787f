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

//! Example demonstrating bloom filter usage

use std::sync::Arc;

use bloomkit::bloom::BloomFilter;
use bloomkit::bloom::BloomFilterBuilder;
use bloomkit::hash::HashFn;
use bloomkit::hash::StdHash;
use bloomkit::hash::join_halves;

fn main() {
    println!("=== Bloom Filter Example ===\n");

    // Example 1: Basic usage
    println!("1. Basic Bloom Filter Usage:");
    let mut filter = BloomFilter::new(27_000, 0.0317).unwrap();
    println!("   {filter}");
    println!("   Hash rounds: {}", filter.hash_rounds());

    filter.insert("foo").unwrap();
    filter.insert("bar").unwrap();
    filter.update(["baz", "qux"]).unwrap();
    for item in ["foo", "bar", "baz", "qux", "quux"] {
        println!("   contains({item:?}): {}", filter.contains(item).unwrap());
    }
    println!("   {filter}");
    println!();

    // Example 2: Fill the filter and watch the error rate grow
    println!("2. Insert the expected number of items:");
    for i in 0..27_000 {
        filter.insert(&format!("item_{i}")).unwrap();
    }
    println!("   Approx items: {:.2}", filter.approx_items());
    println!("   Load factor: {:.4}", filter.load_factor());
    println!("   Estimated fpp: {:.4}", filter.estimated_fpp());
    println!();

    // Example 3: Set operations
    println!("3. Set operations:");
    let mut fruits = BloomFilter::new(1000, 0.01).unwrap();
    fruits.update(["apple", "banana", "cherry"]).unwrap();
    let mut red = BloomFilter::new(1000, 0.01).unwrap();
    red.update(["cherry", "strawberry"]).unwrap();

    let either = fruits.union(&[&red]).unwrap();
    let both = fruits.intersection(&[&red]).unwrap();
    println!("   union contains strawberry: {}", either.contains("strawberry").unwrap());
    println!("   intersection contains cherry: {}", both.contains("cherry").unwrap());
    println!("   intersection contains apple: {}", both.contains("apple").unwrap());
    println!("   fruits <= union: {}", fruits <= either);
    println!("   fruits vs red: {:?}", fruits.partial_cmp(&red));

    let mut incompatible = BloomFilter::new(2000, 0.01).unwrap();
    incompatible.insert("apple").unwrap();
    match fruits.union(&[&incompatible]) {
        Ok(_) => println!("   unexpected union of incompatible filters"),
        Err(err) => println!("   incompatible union rejected: {err}"),
    }
    println!();

    // Example 4: Serialization
    println!("4. Serialization:");
    let bytes = fruits.serialize();
    println!("   Serialized size: {} bytes", bytes.len());
    let restored = BloomFilter::deserialize(&bytes, fruits.hash_func().clone()).unwrap();
    println!("   Round trip preserved the filter: {}", restored == fruits);
    println!();

    // Example 5: Custom hash functions
    println!("5. Custom hash functions:");
    let mut std_filter = BloomFilterBuilder::with_accuracy(1000, 0.01)
        .hash_func(StdHash)
        .build()
        .unwrap();
    std_filter.update([1_u64, 2, 3]).unwrap();
    println!("   StdHash contains 2: {}", std_filter.contains(&2_u64).unwrap());

    let hash = Arc::new(HashFn::new(|bytes: &[u8]| {
        let (h1, h2) = mur3::murmurhash3_x64_128(bytes, 42);
        Ok(join_halves(h1, h2))
    }));
    let mut a = BloomFilterBuilder::with_accuracy(1000, 0.01)
        .shared_hash_func(hash.clone())
        .build()
        .unwrap();
    let b = BloomFilterBuilder::with_accuracy(1000, 0.01)
        .shared_hash_func(hash)
        .build()
        .unwrap();
    a.insert("custom").unwrap();
    println!("   Shared closure filters compatible: {}", a.is_compatible(&b));
    println!("   Custom contains \"custom\": {}", a.contains("custom").unwrap());
}
