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

use std::f64::consts::LN_2;
use std::sync::Arc;

use crate::bloom::BitArray;
use crate::bloom::BloomFilter;
use crate::error::Error;
use crate::hash::Murmur3;

/// The largest supported filter, in bits (~4 GiB of storage).
pub const MAX_NUM_BITS: u64 = (1u64 << 35) - 64;

/// The largest supported number of hash rounds per item.
pub const MAX_HASH_ROUNDS: u64 = u16::MAX as u64;

#[derive(Debug, Clone, Copy)]
enum Sizing {
    Accuracy { expected_items: u64, fpp: f64 },
    Size { num_bits: u64, hash_rounds: u64 },
}

/// Builder for creating [`BloomFilter`] instances.
///
/// Provides two construction modes:
/// - [`with_accuracy()`](Self::with_accuracy): Specify expected items and false positive rate
///   (recommended)
/// - [`with_size()`](Self::with_size): Specify exact bit count and hash rounds (manual)
///
/// The hash function defaults to [`Murmur3::default()`]. Parameters are validated by
/// [`build()`](Self::build), which never produces a partially constructed filter.
#[derive(Debug, Clone)]
pub struct BloomFilterBuilder<H = Murmur3> {
    sizing: Sizing,
    hash_func: Arc<H>,
}

impl BloomFilterBuilder<Murmur3> {
    /// Creates a builder sized for `expected_items` at false positive rate `fpp`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_accuracy(27_000, 0.0317).build().unwrap();
    /// assert_eq!(filter.size_in_bits(), 193_960);
    /// assert_eq!(filter.hash_rounds(), 5);
    /// ```
    pub fn with_accuracy(expected_items: u64, fpp: f64) -> Self {
        BloomFilterBuilder {
            sizing: Sizing::Accuracy {
                expected_items,
                fpp,
            },
            hash_func: Arc::new(Murmur3::default()),
        }
    }

    /// Creates a builder with an explicit bit count and number of hash rounds.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_size(10_000, 7).build().unwrap();
    /// assert_eq!(filter.size_in_bits(), 10_000);
    /// ```
    pub fn with_size(num_bits: u64, hash_rounds: u64) -> Self {
        BloomFilterBuilder {
            sizing: Sizing::Size {
                num_bits,
                hash_rounds,
            },
            hash_func: Arc::new(Murmur3::default()),
        }
    }
}

impl<H> BloomFilterBuilder<H> {
    /// Uses `hash_func` for the filter.
    ///
    /// Each call wraps the function in a new `Arc`; filters built this way are combinable only
    /// if the function's [`same_as`](crate::hash::HashFunction::same_as) says so. Use
    /// [`shared_hash_func()`](Self::shared_hash_func) to share one instance by identity.
    pub fn hash_func<H2>(self, hash_func: H2) -> BloomFilterBuilder<H2> {
        self.shared_hash_func(Arc::new(hash_func))
    }

    /// Uses an already shared hash function for the filter.
    pub fn shared_hash_func<H2>(self, hash_func: Arc<H2>) -> BloomFilterBuilder<H2> {
        BloomFilterBuilder {
            sizing: self.sizing,
            hash_func,
        }
    }

    /// Builds the Bloom filter.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameter`](crate::error::ErrorKind::InvalidParameter) if
    /// `expected_items` is 0, `fpp` is not in (0, 1), or the resulting size is 0 or exceeds
    /// [`MAX_NUM_BITS`]; likewise for explicit sizes with 0 bits, 0 hash rounds or more than
    /// [`MAX_HASH_ROUNDS`] hash rounds.
    pub fn build(self) -> Result<BloomFilter<H>, Error> {
        let (num_bits, hash_rounds) = match self.sizing {
            Sizing::Accuracy {
                expected_items,
                fpp,
            } => optimal_params(expected_items, fpp)?,
            Sizing::Size {
                num_bits,
                hash_rounds,
            } => {
                validate_size(num_bits, hash_rounds)?;
                (num_bits, hash_rounds)
            }
        };

        log::debug!("building bloom filter: size_in_bits={num_bits}, hash_rounds={hash_rounds}");
        BloomFilter::from_parts(hash_rounds, BitArray::new(num_bits), self.hash_func)
    }
}

/// Computes `(size_in_bits, hash_rounds)` for `expected_items` at false positive rate `fpp`.
///
/// The bit count is `ceil(-n * ln(p) / ln(2)^2)` rounded down to whole bytes (minimum 8), and
/// the round count is `max(1, round(m / n * ln(2)))` over that final bit count.
///
/// # Errors
///
/// Returns [`InvalidParameter`](crate::error::ErrorKind::InvalidParameter) on out-of-range
/// input or a size above [`MAX_NUM_BITS`].
///
/// # Examples
///
/// ```
/// # use bloomkit::bloom::optimal_params;
/// assert_eq!(optimal_params(27_000, 0.0317).unwrap(), (193_960, 5));
/// assert_eq!(optimal_params(1000, 0.1).unwrap(), (4792, 3));
/// assert!(optimal_params(0, 0.1).is_err());
/// assert!(optimal_params(1000, 1.0).is_err());
/// ```
pub fn optimal_params(expected_items: u64, fpp: f64) -> Result<(u64, u64), Error> {
    let num_bits = suggest_num_bits(expected_items, fpp)?;
    let hash_rounds = suggest_hash_rounds(expected_items, num_bits);
    Ok((num_bits, hash_rounds))
}

/// Suggests the number of bits for `expected_items` at false positive rate `fpp`.
///
/// Formula: `m = ceil(-n * ln(p) / (ln(2)^2))`, then truncated to a multiple of 8 with a
/// minimum of 8.
pub fn suggest_num_bits(expected_items: u64, fpp: f64) -> Result<u64, Error> {
    if expected_items == 0 {
        return Err(Error::invalid_parameter("expected_items must be greater than 0"));
    }
    if !(fpp > 0.0 && fpp < 1.0) {
        return Err(
            Error::invalid_parameter("fpp must be between 0.0 and 1.0 (exclusive)")
                .with_context("fpp", fpp),
        );
    }

    let n = expected_items as f64;
    let bits = (-n * fpp.ln() / (LN_2 * LN_2)).ceil();
    if bits > MAX_NUM_BITS as f64 {
        return Err(Error::invalid_parameter("filter would be too large")
            .with_context("expected_items", expected_items)
            .with_context("fpp", fpp));
    }

    let bits = (bits as u64).max(1);
    Ok((bits / 8).max(1) * 8)
}

/// Suggests the number of hash rounds for `expected_items` in a filter of `num_bits` bits.
///
/// Formula: `k = max(1, round((m / n) * ln(2)))`, capped at [`MAX_HASH_ROUNDS`].
pub fn suggest_hash_rounds(expected_items: u64, num_bits: u64) -> u64 {
    let m = num_bits as f64;
    let n = expected_items.max(1) as f64;
    (m / n * LN_2).round().clamp(1.0, MAX_HASH_ROUNDS as f64) as u64
}

pub(crate) fn validate_size(num_bits: u64, hash_rounds: u64) -> Result<(), Error> {
    if num_bits == 0 {
        return Err(Error::invalid_parameter("num_bits must be at least 1"));
    }
    if num_bits > MAX_NUM_BITS {
        return Err(
            Error::invalid_parameter(format!("num_bits must not exceed {MAX_NUM_BITS}"))
                .with_context("num_bits", num_bits),
        );
    }
    if hash_rounds == 0 {
        return Err(Error::invalid_parameter("hash_rounds must be at least 1"));
    }
    if hash_rounds > MAX_HASH_ROUNDS {
        return Err(Error::invalid_parameter(format!(
            "hash_rounds must not exceed {MAX_HASH_ROUNDS}"
        ))
        .with_context("hash_rounds", hash_rounds));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::hash::StdHash;

    #[test]
    fn test_reference_sizes() {
        assert_eq!(optimal_params(27_000, 0.0317).unwrap(), (193_960, 5));
        assert_eq!(suggest_num_bits(1000, 0.01).unwrap(), 9584);
        assert_eq!(suggest_hash_rounds(1000, 9584), 7);
    }

    #[test]
    fn test_tiny_filters_keep_one_byte() {
        // raw size is 3 bits
        assert_eq!(optimal_params(1140, 0.999).unwrap(), (8, 1));
    }

    #[test]
    fn test_invalid_accuracy() {
        for (n, p) in [(0, 0.01), (10, 0.0), (10, 1.0), (10, -0.5), (10, f64::NAN)] {
            let err = optimal_params(n, p).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter, "n={n}, p={p}");
        }
    }

    #[test]
    fn test_too_large() {
        let err = optimal_params(u64::MAX, 1e-10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_builder_with_size() {
        let filter = BloomFilterBuilder::with_size(1024, 5).build().unwrap();
        assert_eq!(filter.size_in_bits(), 1024);
        assert_eq!(filter.hash_rounds(), 5);

        let err = BloomFilterBuilder::with_size(0, 5).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        let err = BloomFilterBuilder::with_size(64, 0).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_hash_rounds_are_capped() {
        let filter = BloomFilterBuilder::with_size(64, MAX_HASH_ROUNDS).build().unwrap();
        assert_eq!(filter.hash_rounds(), MAX_HASH_ROUNDS);

        for hash_rounds in [MAX_HASH_ROUNDS + 1, 1 << 33, u64::MAX] {
            let err = BloomFilterBuilder::with_size(64, hash_rounds)
                .build()
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        }

        let err = BloomFilter::from_parts(u64::MAX, BitArray::new(64), Arc::new(StdHash))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert_eq!(suggest_hash_rounds(1, MAX_NUM_BITS), MAX_HASH_ROUNDS);
    }

    #[test]
    fn test_builder_hash_func() {
        let filter = BloomFilterBuilder::with_accuracy(100, 0.01)
            .hash_func(StdHash)
            .build()
            .unwrap();
        assert_eq!(**filter.hash_func(), StdHash);

        let shared = Arc::new(Murmur3::with_seed(5));
        let filter = BloomFilterBuilder::with_accuracy(100, 0.01)
            .shared_hash_func(shared.clone())
            .build()
            .unwrap();
        assert!(Arc::ptr_eq(filter.hash_func(), &shared));
    }
}
