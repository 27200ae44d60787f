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

//! Binary persistence for Bloom filters.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! byte 0      preamble longs (3)
//! byte 1      serial version (1)
//! byte 2      format id (0x42)
//! bytes 3-7   reserved, zero
//! bytes 8-15  size_in_bits (m), u64
//! bytes 16-23 hash_rounds (k), u64
//! bytes 24..  bit array, ceil(m / 8) bytes; bit i is bit (i % 8) of byte (i / 8)
//! ```
//!
//! The hash function is never written. Loading requires the caller to supply one, which is
//! assumed to be the function the filter was saved with: a different function yields a
//! well-formed filter that answers membership queries wrongly.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::bloom::BitArray;
use crate::bloom::BloomFilter;
use crate::bloom::MAX_HASH_ROUNDS;
use crate::bloom::MAX_NUM_BITS;
use crate::codec::FilterBytes;
use crate::codec::FilterSlice;
use crate::error::Error;

pub(crate) const PREAMBLE_LONGS: u8 = 3;
pub(crate) const SERIAL_VERSION: u8 = 1;
pub(crate) const FORMAT_ID: u8 = 0x42;

const PREAMBLE_BYTES: usize = PREAMBLE_LONGS as usize * 8;
const RESERVED_BYTES: usize = 5;

impl<H> BloomFilter<H> {
    /// Serializes the filter to a byte vector.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomkit::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(100, 0.01).unwrap();
    /// filter.insert("test").unwrap();
    ///
    /// let bytes = filter.serialize();
    /// let restored = BloomFilter::deserialize(&bytes, filter.hash_func().clone()).unwrap();
    /// assert_eq!(filter, restored);
    /// assert!(restored.contains("test").unwrap());
    /// ```
    pub fn serialize(&self) -> Vec<u8> {
        let payload = self.bit_array().to_le_bytes();
        let mut bytes = FilterBytes::with_capacity(PREAMBLE_BYTES + payload.len());

        // Preamble
        bytes.write_u8(PREAMBLE_LONGS);
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(FORMAT_ID);
        bytes.write_zeros(RESERVED_BYTES);
        bytes.write_u64_le(self.size_in_bits());
        bytes.write_u64_le(self.hash_rounds());

        // Bit array
        bytes.write(&payload);
        bytes.into_bytes()
    }

    /// Deserializes a filter from bytes, hashing with `hash_func`.
    ///
    /// # Errors
    ///
    /// Returns [`CorruptData`](crate::error::ErrorKind::CorruptData) if:
    /// - The data is truncated or has trailing bytes
    /// - The preamble, serial version or format id is not recognized
    /// - The declared size or hash round count is 0 or out of range (see [`MAX_NUM_BITS`]
    ///   and [`MAX_HASH_ROUNDS`])
    /// - Padding bits after the last filter bit are set
    pub fn deserialize(bytes: &[u8], hash_func: Arc<H>) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        let mut cursor = FilterSlice::new(bytes);
        let preamble_longs = cursor.read_u8().map_err(make_error("preamble_longs"))?;
        let serial_version = cursor.read_u8().map_err(make_error("serial_version"))?;
        let format_id = cursor.read_u8().map_err(make_error("format_id"))?;
        cursor
            .skip(RESERVED_BYTES as u64)
            .map_err(make_error("reserved"))?;

        // Validate
        if format_id != FORMAT_ID {
            return Err(Error::invalid_format_id(FORMAT_ID, format_id));
        }
        if serial_version != SERIAL_VERSION {
            return Err(Error::unsupported_serial_version(
                SERIAL_VERSION,
                serial_version,
            ));
        }
        if preamble_longs != PREAMBLE_LONGS {
            return Err(Error::invalid_preamble_longs(PREAMBLE_LONGS, preamble_longs));
        }

        let size_in_bits = cursor.read_u64_le().map_err(make_error("size_in_bits"))?;
        let hash_rounds = cursor.read_u64_le().map_err(make_error("hash_rounds"))?;
        if size_in_bits == 0 || size_in_bits > MAX_NUM_BITS {
            return Err(Error::corrupt(format!(
                "size_in_bits must be in [1, {MAX_NUM_BITS}], got {size_in_bits}"
            )));
        }
        if hash_rounds == 0 || hash_rounds > MAX_HASH_ROUNDS {
            return Err(Error::corrupt(format!(
                "hash_rounds must be in [1, {MAX_HASH_ROUNDS}], got {hash_rounds}"
            )));
        }

        let payload_len = size_in_bits.div_ceil(8);
        let remaining = cursor.remaining();
        if remaining < payload_len {
            return Err(Error::insufficient_data("bit_array")
                .with_context("expected_bytes", payload_len)
                .with_context("actual_bytes", remaining));
        }
        if remaining > payload_len {
            return Err(Error::corrupt("unexpected trailing bytes after bit array")
                .with_context("expected_bytes", payload_len)
                .with_context("actual_bytes", remaining));
        }

        let mut payload = vec![0u8; payload_len as usize];
        cursor
            .read_exact(&mut payload)
            .map_err(make_error("bit_array"))?;
        let bits = BitArray::from_le_bytes(size_in_bits, &payload)?;

        BloomFilter::from_parts(hash_rounds, bits, hash_func)
    }

    /// Writes the serialized filter to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an [`Io`](crate::error::ErrorKind::Io) error if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let bytes = self.serialize();
        fs::write(path, &bytes).map_err(|err| {
            Error::io("failed to write bloom filter", err)
                .with_context("path", path.display())
        })?;
        log::debug!(
            "saved bloom filter: path={}, size_in_bits={}, bytes={}",
            path.display(),
            self.size_in_bits(),
            bytes.len()
        );
        Ok(())
    }

    /// Reads a filter previously written by [`save`](Self::save), hashing with `hash_func`.
    ///
    /// # Errors
    ///
    /// Returns an [`Io`](crate::error::ErrorKind::Io) error if the file cannot be read, or
    /// [`CorruptData`](crate::error::ErrorKind::CorruptData) as for
    /// [`deserialize`](Self::deserialize).
    pub fn load(path: impl AsRef<Path>, hash_func: Arc<H>) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| {
            Error::io("failed to read bloom filter", err).with_context("path", path.display())
        })?;
        let filter = Self::deserialize(&bytes, hash_func)
            .map_err(|err| err.with_context("path", path.display()))?;
        log::debug!(
            "loaded bloom filter: path={}, size_in_bits={}, hash_rounds={}",
            path.display(),
            filter.size_in_bits(),
            filter.hash_rounds()
        );
        Ok(filter)
    }
}
