// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{BucketTable, Error};

/// Number of buckets in a default table.
pub const DEFAULT_MODULUS: usize = 2_000_003;

/// Number of states a single bucket can hold in a default table.
pub const DEFAULT_BUCKET_CAPACITY: usize = 9;

/// Largest number of buckets a table may have.
pub const MAX_MODULUS: usize = u32::MAX as usize;

/// Bucket table configuration builder
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Number of buckets (table modulus)
    #[doc(hidden)]
    pub modulus: usize,

    /// Maximum number of states per bucket
    #[doc(hidden)]
    pub bucket_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            modulus: DEFAULT_MODULUS,
            bucket_capacity: DEFAULT_BUCKET_CAPACITY,
        }
    }
}

impl Config {
    /// Initializes a new config with the default table layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of buckets.
    ///
    /// The modulus is fixed for the lifetime of a table and is written
    /// as the first line of every serialized table, so a table can only
    /// be read back with the same layout.
    ///
    /// Defaults to 2,000,003.
    #[must_use]
    pub fn modulus(mut self, n: usize) -> Self {
        self.modulus = n;
        self
    }

    /// Sets how many colliding states a bucket can hold.
    ///
    /// Once a bucket is full, further states hashing to it are rejected
    /// and only counted.
    ///
    /// Defaults to 9.
    #[must_use]
    pub fn bucket_capacity(mut self, n: usize) -> Self {
        self.bucket_capacity = n;
        self
    }

    pub(crate) fn validate(&self) -> crate::Result<()> {
        if self.modulus == 0 {
            return Err(Error::InvalidConfig("modulus must be greater than 0"));
        }

        // Bucket indexes are reduced from a signed 64-bit accumulator
        if self.modulus > MAX_MODULUS || i64::try_from(self.modulus).is_err() {
            return Err(Error::InvalidConfig("modulus is too large"));
        }

        if self.bucket_capacity == 0 {
            return Err(Error::InvalidConfig("bucket capacity must be greater than 0"));
        }

        Ok(())
    }

    /// Allocates an empty bucket table.
    ///
    /// # Errors
    ///
    /// Returns error if the modulus or bucket capacity is 0, the modulus
    /// exceeds [`MAX_MODULUS`], or the buckets cannot be allocated.
    pub fn build(self) -> crate::Result<BucketTable> {
        BucketTable::with_config(self)
    }
}
