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
use std::sync::Arc;

use bloomkit::bloom::BloomFilter;
use bloomkit::bloom::BloomFilterBuilder;
use bloomkit::error::ErrorKind;
use bloomkit::hash::Murmur3;
use googletest::assert_that;
use googletest::prelude::contains_substring;

fn filter_with<'a>(items: impl IntoIterator<Item = &'a str>) -> BloomFilter {
    let mut filter = BloomFilter::new(1000, 0.01).unwrap();
    filter.update(items).unwrap();
    filter
}

#[test]
fn test_union_is_commutative_and_associative() {
    let a = filter_with(["apple", "banana"]);
    let b = filter_with(["cherry"]);
    let c = filter_with(["durian", "elderberry"]);

    assert_eq!(a.union(&[&b]).unwrap(), b.union(&[&a]).unwrap());
    assert_eq!(
        a.union(&[&b]).unwrap().union(&[&c]).unwrap(),
        a.union(&[&b.union(&[&c]).unwrap()]).unwrap()
    );
    assert_eq!(a.union(&[&b, &c]).unwrap(), c.union(&[&a, &b]).unwrap());
}

#[test]
fn test_intersection_is_commutative_and_associative() {
    let a = filter_with(["apple", "banana", "cherry"]);
    let b = filter_with(["banana", "cherry", "durian"]);
    let c = filter_with(["cherry", "durian", "apple"]);

    assert_eq!(a.intersection(&[&b]).unwrap(), b.intersection(&[&a]).unwrap());
    assert_eq!(
        a.intersection(&[&b]).unwrap().intersection(&[&c]).unwrap(),
        a.intersection(&[&b.intersection(&[&c]).unwrap()]).unwrap()
    );
}

#[test]
fn test_union_and_intersection_are_idempotent() {
    let a = filter_with(["apple", "banana"]);
    assert_eq!(a.union(&[&a]).unwrap(), a);
    assert_eq!(a.intersection(&[&a]).unwrap(), a);
    assert_eq!(a.union(&[]).unwrap(), a);
    assert_eq!(a.intersection(&[]).unwrap(), a);
}

#[test]
fn test_disjoint_sets() {
    let a = filter_with(["foo"]);
    let b = filter_with(["bar"]);

    let union = a.union(&[&b]).unwrap();
    assert!(union.contains("foo").unwrap());
    assert!(union.contains("bar").unwrap());
    assert!(a < union);
    assert!(b < union);

    let intersection = a.intersection(&[&b]).unwrap();
    assert!(!intersection.contains("foo").unwrap());
    assert!(!intersection.contains("bar").unwrap());
    assert!(intersection.is_subset(&a).unwrap());
    assert!(intersection.is_subset(&b).unwrap());
}

#[test]
fn test_intersection_with_empty_filter_is_empty() {
    let a = filter_with(["foo", "bar"]);
    let empty = filter_with([]);
    assert!(a.intersection(&[&empty]).unwrap().is_empty());
    assert_eq!(a.union(&[&empty]).unwrap(), a);
    assert!(empty <= a);
}

#[test]
fn test_subset_order() {
    let small = filter_with(["foo"]);
    let big = filter_with(["foo", "bar", "baz"]);

    assert!(small.is_strict_subset(&big).unwrap());
    assert!(big.is_strict_superset(&small).unwrap());
    assert!(!big.is_subset(&small).unwrap());
    assert_eq!(small.partial_cmp(&big), Some(Ordering::Less));
    assert_eq!(big.partial_cmp(&small), Some(Ordering::Greater));
    assert_eq!(small.partial_cmp(&small.clone()), Some(Ordering::Equal));

    let other = filter_with(["qux"]);
    assert_eq!(small.partial_cmp(&other), None);
}

#[test]
fn test_in_place_updates_match_pure_operations() {
    let a = filter_with(["apple", "banana"]);
    let b = filter_with(["banana", "cherry"]);
    let c = filter_with(["banana", "durian"]);

    let mut unioned = a.clone();
    unioned.union_update(&[&b, &c]).unwrap();
    assert_eq!(unioned, a.union(&[&b, &c]).unwrap());

    let mut intersected = a.clone();
    intersected.intersection_update(&[&b, &c]).unwrap();
    assert_eq!(intersected, a.intersection(&[&b, &c]).unwrap());
    assert!(intersected.contains("banana").unwrap());
}

#[test]
fn test_update_with_copy_of_self() {
    let mut a = filter_with(["apple", "banana"]);
    let copy = a.clone();
    a.union_update(&[&copy, &copy]).unwrap();
    assert_eq!(a, copy);
    a.intersection_update(&[&copy]).unwrap();
    assert_eq!(a, copy);
}

#[test]
fn test_intersection_update_with_items() {
    let mut a = filter_with(["foo", "bar", "baz"]);
    a.batch_intersection_update()
        .items(["foo", "baz"])
        .unwrap()
        .apply();
    assert!(a.contains("foo").unwrap());
    assert!(a.contains("baz").unwrap());
    assert!(!a.contains("bar").unwrap());
}

#[test]
fn test_incompatible_operands_are_rejected() {
    let a = filter_with(["foo"]);
    let larger = {
        let mut f = BloomFilter::new(2000, 0.01).unwrap();
        f.insert("bar").unwrap();
        f
    };
    let other_seed = {
        let mut f = BloomFilterBuilder::with_accuracy(1000, 0.01)
            .hash_func(Murmur3::with_seed(7))
            .build()
            .unwrap();
        f.insert("bar").unwrap();
        f
    };

    let err = a.union(&[&larger]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleFilter);
    let err = a.intersection(&[&other_seed]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleFilter);
    assert_that!(err.to_string(), contains_substring("hash function"));

    let compatible = filter_with(["baz"]);
    let mut target = a.clone();
    let err = target.union_update(&[&compatible, &larger]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleFilter);
    assert_eq!(target, a);
    assert!(!target.contains("baz").unwrap());

    let err = target
        .batch_update()
        .filter(&compatible)
        .and_then(|batch| batch.filter(&larger))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleFilter);
    assert_eq!(target, a);

    assert_eq!(a.is_subset(&larger).unwrap_err().kind(), ErrorKind::IncompatibleFilter);
    assert_eq!(a.partial_cmp(&larger), None);
    assert_ne!(a, larger);
}

#[test]
fn test_shared_hash_function_makes_filters_compatible() {
    let hash = Arc::new(Murmur3::with_seed(42));
    let build = || {
        BloomFilterBuilder::with_accuracy(500, 0.05)
            .shared_hash_func(hash.clone())
            .build()
            .unwrap()
    };
    let mut a = build();
    let mut b = build();
    a.insert("foo").unwrap();
    b.insert("bar").unwrap();

    let union = a.union(&[&b]).unwrap();
    assert!(union.contains("foo").unwrap());
    assert!(union.contains("bar").unwrap());
    assert!(Arc::ptr_eq(union.hash_func(), &hash));
}
