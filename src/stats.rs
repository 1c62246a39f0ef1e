// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{bucket::InsertResult, hash::BucketIndex};

/// Collision statistics of a bucket table
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InsertStats {
    /// Number of states handed to the table
    pub(crate) offered: usize,

    /// Number of states that were stored
    pub(crate) inserted: usize,

    /// Number of states dropped because their bucket was full
    pub(crate) rejected: usize,

    /// Number of buckets holding at least one state
    pub(crate) occupied_buckets: usize,

    /// Highest bucket occupancy seen
    pub(crate) max_occupancy: usize,

    /// First bucket that reached `max_occupancy`
    pub(crate) max_bucket: Option<BucketIndex>,
}

impl InsertStats {
    pub(crate) fn record(&mut self, index: BucketIndex, result: InsertResult, bucket_len: usize) {
        self.offered += 1;

        match result {
            InsertResult::Inserted(slot) => {
                self.inserted += 1;

                if slot == 0 {
                    self.occupied_buckets += 1;
                }

                if bucket_len > self.max_occupancy {
                    self.max_occupancy = bucket_len;
                    self.max_bucket = Some(index);
                }
            }
            InsertResult::Rejected(_) => {
                self.rejected += 1;
            }
        }
    }

    /// Number of states handed to the table.
    #[must_use]
    pub fn offered(&self) -> usize {
        self.offered
    }

    /// Number of states that were stored.
    #[must_use]
    pub fn insertions(&self) -> usize {
        self.inserted
    }

    /// Number of states that were dropped because their bucket was full.
    #[must_use]
    pub fn rejections(&self) -> usize {
        self.rejected
    }

    /// Number of non-empty buckets.
    #[must_use]
    pub fn occupied_buckets(&self) -> usize {
        self.occupied_buckets
    }

    /// Highest number of states held by a single bucket.
    #[must_use]
    pub fn max_occupancy(&self) -> usize {
        self.max_occupancy
    }

    /// Bucket that first reached [`InsertStats::max_occupancy`].
    #[must_use]
    pub fn max_bucket(&self) -> Option<BucketIndex> {
        self.max_bucket
    }

    /// Returns `true` if any state was dropped.
    #[must_use]
    pub fn has_rejections(&self) -> bool {
        self.rejected > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::BucketFull;
    use test_log::test;

    #[test]
    fn stats_track_first_max_bucket() {
        let mut stats = InsertStats::default();

        stats.record(5, InsertResult::Inserted(0), 1);
        stats.record(3, InsertResult::Inserted(0), 1);
        stats.record(3, InsertResult::Inserted(1), 2);
        stats.record(5, InsertResult::Inserted(1), 2);
        stats.record(3, InsertResult::Rejected(BucketFull), 2);

        assert_eq!(5, stats.offered());
        assert_eq!(4, stats.insertions());
        assert_eq!(1, stats.rejections());
        assert_eq!(2, stats.occupied_buckets());
        assert_eq!(2, stats.max_occupancy());
        assert_eq!(Some(3), stats.max_bucket());
        assert!(stats.has_rejections());
    }
}
