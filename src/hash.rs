// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{state::StateVector, Error};

/// Position of a bucket in the table, in `[0, modulus)`
pub type BucketIndex = usize;

/// Offset added to every cell value (the code point of `'0'`)
pub const DIGIT_OFFSET: i64 = b'0' as i64;

/// Left shift of the rolling accumulator per cell
pub const HASH_SHIFT: u32 = 5;

/// Computes the raw 64-bit rolling key of a state.
///
/// Cells are consumed from the last column to the first, each one
/// contributing `cell + '0'` through `h = (h << 5) - h + c` with
/// two's complement wrapping. Counter fields are not part of the key.
#[must_use]
#[allow(clippy::eq_op)]
pub fn rolling_hash(state: &StateVector) -> i64 {
    state.cells().iter().rev().fold(0_i64, |h, &cell| {
        let c = i64::from(cell) + DIGIT_OFFSET;
        let h = h.wrapping_shl(HASH_SHIFT).wrapping_sub(h).wrapping_add(c);

        // NOTE: No-op, kept so the recurrence reads like the reference hash
        h & h
    })
}

/// Maps states to bucket indexes of a table with a fixed modulus
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BucketHasher {
    modulus: i64,
}

impl BucketHasher {
    /// Creates a hasher for a table of `modulus` buckets.
    ///
    /// # Errors
    ///
    /// Returns error if the modulus is 0 or does not fit into an `i64`.
    pub fn new(modulus: usize) -> crate::Result<Self> {
        let modulus = i64::try_from(modulus)
            .map_err(|_| Error::InvalidConfig("modulus does not fit into i64"))?;

        if modulus == 0 {
            return Err(Error::InvalidConfig("modulus must be greater than 0"));
        }

        Ok(Self { modulus })
    }

    /// Number of buckets.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn modulus(&self) -> usize {
        // NOTE: Constructed from a usize
        self.modulus as usize
    }

    /// Reduces a raw rolling key into `[0, modulus)`.
    ///
    /// Equal to `|h| mod modulus`, without overflowing on `i64::MIN`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn reduce(&self, h: i64) -> BucketIndex {
        // NOTE: The remainder is smaller than the modulus, which is a usize
        (h % self.modulus).unsigned_abs() as BucketIndex
    }

    /// Computes the bucket index of a state.
    #[must_use]
    pub fn hash(&self, state: &StateVector) -> BucketIndex {
        self.reduce(rolling_hash(state))
    }
}
