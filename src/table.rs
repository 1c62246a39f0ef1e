// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    bucket::{Bucket, BucketFull, InsertResult},
    coding::{Decode, DecodeError, Encode, EncodeError, LineCursor},
    config::{Config, DEFAULT_BUCKET_CAPACITY},
    file::write_atomic,
    hash::{BucketHasher, BucketIndex},
    state::{StateVector, PERSISTED_LEN, STATE_LEN},
    stats::InsertStats,
    Error,
};
use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
};

/// A fixed-size table of bounded buckets
///
/// The number of buckets never changes after construction. Every
/// state lands in the bucket its hash points to; once a bucket is full,
/// further states for it are rejected and only counted in
/// [`InsertStats`].
///
/// # Examples
///
/// ```
/// # use c4_hash::{Config, StateVector};
/// #
/// let mut table = Config::new().modulus(101).bucket_capacity(2).build()?;
///
/// let state = StateVector::from_position("4435")?;
/// assert!(table.insert_state(state).is_inserted());
///
/// assert_eq!(Some(&state), table.get(&state));
/// assert_eq!(1, table.len());
/// #
/// # Ok::<(), c4_hash::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct BucketTable {
    config: Config,
    hasher: BucketHasher,
    buckets: Box<[Bucket]>,
    stats: InsertStats,
}

impl BucketTable {
    pub(crate) fn with_config(config: Config) -> crate::Result<Self> {
        config.validate()?;

        let hasher = BucketHasher::new(config.modulus)?;

        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(config.modulus)
            .map_err(|_| Error::InvalidConfig("cannot allocate buckets"))?;
        buckets.resize_with(config.modulus, Bucket::default);

        log::debug!(
            "Allocated bucket table with {} buckets of capacity {}",
            config.modulus,
            config.bucket_capacity,
        );

        Ok(Self {
            config,
            hasher,
            buckets: buckets.into_boxed_slice(),
            stats: InsertStats::default(),
        })
    }

    /// Number of buckets.
    #[must_use]
    pub fn modulus(&self) -> usize {
        self.config.modulus
    }

    /// Maximum number of states per bucket.
    #[must_use]
    pub fn bucket_capacity(&self) -> usize {
        self.config.bucket_capacity
    }

    /// Returns the hasher that maps states to buckets of this table.
    #[must_use]
    pub fn hasher(&self) -> &BucketHasher {
        &self.hasher
    }

    /// Returns the collision statistics.
    #[must_use]
    pub fn stats(&self) -> &InsertStats {
        &self.stats
    }

    /// Number of stored states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stats.insertions()
    }

    /// Returns `true` if no state is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the bucket at `index`.
    #[must_use]
    pub fn bucket(&self, index: BucketIndex) -> Option<&Bucket> {
        self.buckets.get(index)
    }

    /// Iterates over all non-empty buckets in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (BucketIndex, &Bucket)> + '_ {
        self.buckets
            .iter()
            .enumerate()
            .filter(|(_, bucket)| !bucket.is_empty())
    }

    /// Stores a state in the bucket at `index`.
    ///
    /// A full bucket is not an error: the state is dropped and
    /// [`InsertResult::Rejected`] is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index` is not smaller than the modulus.
    pub fn insert(&mut self, index: BucketIndex, state: StateVector) -> crate::Result<InsertResult> {
        let capacity = self.config.bucket_capacity;

        let Some(bucket) = self.buckets.get_mut(index) else {
            return Err(Error::IndexOutOfRange {
                index,
                modulus: self.config.modulus,
            });
        };

        let result = bucket.push(state, capacity);
        self.stats.record(index, result, bucket.len());

        if !result.is_inserted() {
            log::debug!("Bucket {index} is full, dropping state {state}");
        }

        Ok(result)
    }

    /// Hashes a state and stores it in its bucket.
    pub fn insert_state(&mut self, state: StateVector) -> InsertResult {
        let index = self.hasher.hash(&state);

        // NOTE: The hasher only produces indexes below the modulus
        debug_assert!(index < self.buckets.len());

        self.insert(index, state).unwrap_or_else(|e| {
            log::error!("Dropping state {state}: {e}");
            InsertResult::Rejected(BucketFull)
        })
    }

    /// Returns the stored state describing the same board as `state`.
    ///
    /// Only the column cells are compared; counters are ignored.
    #[must_use]
    pub fn get(&self, state: &StateVector) -> Option<&StateVector> {
        self.bucket(self.hasher.hash(state))
            .and_then(|bucket| bucket.find(state))
    }

    /// Returns `true` if a state with the same board is stored.
    #[must_use]
    pub fn contains(&self, state: &StateVector) -> bool {
        self.get(state).is_some()
    }

    /// Reads a serialized table, allowing buckets of up to `bucket_capacity` states.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the input is not a valid table.
    pub fn decode_with_capacity<R: BufRead>(
        reader: &mut R,
        bucket_capacity: usize,
    ) -> Result<Self, DecodeError> {
        let mut cursor = LineCursor::new(reader);

        let modulus = cursor
            .next_number::<usize>()?
            .ok_or(DecodeError::InvalidHeader("missing modulus"))?;

        let config = Config::new()
            .modulus(modulus)
            .bucket_capacity(bucket_capacity);

        let mut table =
            Self::with_config(config).map_err(|_| DecodeError::InvalidHeader("unusable modulus"))?;

        let mut previous: Option<BucketIndex> = None;

        while let Some(index) = cursor.next_number::<BucketIndex>()? {
            let line = cursor.line();

            if index >= modulus {
                return Err(DecodeError::InvalidBucket {
                    line,
                    reason: "bucket index out of range",
                });
            }

            if previous.is_some_and(|p| index <= p) {
                return Err(DecodeError::InvalidBucket {
                    line,
                    reason: "bucket indexes not ascending",
                });
            }
            previous = Some(index);

            let size = cursor
                .next_number::<usize>()?
                .ok_or(DecodeError::UnexpectedEof { line: line + 1 })?;

            if size == 0 || size > bucket_capacity {
                return Err(DecodeError::InvalidBucket {
                    line: line + 1,
                    reason: "bucket size out of range",
                });
            }

            for _ in 0..size {
                let line = cursor.line() + 1;

                let Some(row) = cursor.next_line()? else {
                    return Err(DecodeError::UnexpectedEof { line });
                };

                let state = parse_row(row, line)?;

                let result = table
                    .insert(index, state)
                    .map_err(|_| DecodeError::InvalidBucket {
                        line,
                        reason: "bucket index out of range",
                    })?;

                debug_assert!(result.is_inserted());
            }
        }

        Ok(table)
    }

    /// Writes the table to `path`.
    ///
    /// The file is replaced atomically: on error, no partial table is
    /// left behind.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();

        write_atomic(path, |writer| {
            self.encode_into(writer)?;
            Ok(())
        })?;

        log::info!(
            "Wrote {} states in {} buckets to {path:?}",
            self.len(),
            self.stats.occupied_buckets(),
        );

        Ok(())
    }

    /// Reads a table written by [`BucketTable::save`].
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs, or the file is not a valid table.
    pub fn open<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Ok(Self::decode_from(&mut reader)?)
    }
}

/// Parses one stored state line: at least [`PERSISTED_LEN`] integers,
/// plus an optional last counter.
fn parse_row(row: &str, line: usize) -> Result<StateVector, DecodeError> {
    let mut fields = [0; STATE_LEN];
    let mut tokens = row.split_ascii_whitespace();

    for (idx, field) in fields.iter_mut().enumerate() {
        let Some(token) = tokens.next() else {
            if idx < PERSISTED_LEN {
                return Err(DecodeError::InvalidBucket {
                    line,
                    reason: "state row is too short",
                });
            }
            break;
        };

        *field = token.parse().map_err(|_| DecodeError::InvalidNumber {
            line,
            token: token.to_owned(),
        })?;
    }

    Ok(StateVector::from(fields))
}

impl Encode for BucketTable {
    fn encode_into<W: Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        writeln!(writer, "{}", self.modulus())?;

        for (index, bucket) in self.iter() {
            writeln!(writer, "{index}")?;
            writeln!(writer, "{}", bucket.len())?;

            for state in bucket.states() {
                let mut fields = state.persisted();

                if let Some(first) = fields.next() {
                    write!(writer, "{first}")?;
                }

                for field in fields {
                    write!(writer, " {field}")?;
                }

                writeln!(writer)?;
            }
        }

        Ok(())
    }
}

impl Decode for BucketTable {
    fn decode_from<R: BufRead>(reader: &mut R) -> Result<Self, DecodeError> {
        Self::decode_with_capacity(reader, DEFAULT_BUCKET_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn state(first: i32, counter: i32) -> StateVector {
        StateVector::from([first, 0, 0, 0, 0, 0, 0, counter, counter, counter])
    }

    #[test]
    fn table_insert_out_of_range() -> crate::Result<()> {
        let mut table = Config::new().modulus(7).build()?;

        assert!(matches!(
            table.insert(7, state(0, 0)),
            Err(Error::IndexOutOfRange {
                index: 7,
                modulus: 7
            })
        ));
        assert_eq!(0, table.stats().offered());

        Ok(())
    }

    #[test]
    fn table_capacity() -> crate::Result<()> {
        let mut table = Config::new().modulus(7).bucket_capacity(3).build()?;

        for i in 0..3 {
            assert_eq!(InsertResult::Inserted(i), table.insert(4, state(i as i32, 0))?);
        }

        assert_eq!(
            InsertResult::Rejected(BucketFull),
            table.insert(4, state(9, 0))?
        );

        assert_eq!(Some(3), table.bucket(4).map(Bucket::len));
        assert_eq!(3, table.len());
        assert_eq!(1, table.stats().rejections());
        assert_eq!(Some(4), table.stats().max_bucket());

        Ok(())
    }

    #[test]
    fn table_insert_state_stays_in_range() -> crate::Result<()> {
        let mut table = Config::new().modulus(7).bucket_capacity(100).build()?;

        for first in [i32::MIN, -1, 0, 1, i32::MAX] {
            for counter in 0..5 {
                assert!(table.insert_state(state(first, counter)).is_inserted());
            }
        }

        assert_eq!(25, table.len());
        assert_eq!(0, table.stats().rejections());

        Ok(())
    }

    #[test]
    fn table_decode_huge_modulus_is_header_error() {
        let mut input: &[u8] = b"9000000000000000000\n";

        assert!(matches!(
            BucketTable::decode_from(&mut input),
            Err(DecodeError::InvalidHeader(_))
        ));
    }

    #[test]
    fn table_get() -> crate::Result<()> {
        let mut table = Config::new().modulus(13).build()?;

        let stored = state(5, 17);
        assert!(table.insert_state(stored).is_inserted());

        assert_eq!(Some(&stored), table.get(&state(5, 0)));
        assert!(table.contains(&stored));
        assert!(!table.contains(&state(6, 17)));

        Ok(())
    }

    #[test]
    fn table_encode_layout() -> crate::Result<()> {
        let mut table = Config::new().modulus(7).build()?;

        let _ = table.insert(5, StateVector::from([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]))?;
        let _ = table.insert(2, StateVector::from([0, 0, 0, 0, 0, 0, 1, 0, 0, 4]))?;
        let _ = table.insert(5, StateVector::from([7, 6, 5, 4, 3, 2, 1, 0, 0, 0]))?;

        let encoded = String::from_utf8(table.encode_into_vec()).unwrap_or_default();

        assert_eq!(
            "7\n2\n1\n0 0 0 0 0 0 1 0 0\n5\n2\n1 2 3 4 5 6 7 8 9\n7 6 5 4 3 2 1 0 0\n",
            encoded
        );

        Ok(())
    }

    #[test]
    fn table_encode_empty() -> crate::Result<()> {
        let table = Config::new().modulus(7).build()?;
        assert_eq!(b"7\n".to_vec(), table.encode_into_vec());
        Ok(())
    }

    #[test]
    fn table_decode_ten_field_rows() -> crate::Result<()> {
        let mut input: &[u8] = b"7\n3\n1\n1 2 3 4 5 6 7 8 9 10\n";
        let table = BucketTable::decode_from(&mut input)?;

        assert_eq!(7, table.modulus());
        assert_eq!(
            Some(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]),
            table
                .bucket(3)
                .and_then(|b| b.states().first())
                .map(StateVector::fields)
        );

        Ok(())
    }

    #[test]
    fn table_decode_invalid() {
        let cases: &[(&[u8], &str)] = &[
            (b"", "missing header"),
            (b"x\n", "bad header"),
            (b"0\n", "zero modulus"),
            (b"9000000000000000000\n", "huge modulus"),
            (b"5000000000\n", "modulus above limit"),
            (b"7\n7\n1\n0 0 0 0 0 0 0 0 0\n", "index out of range"),
            (b"7\n3\n1\n0 0 0 0 0 0 0 0 0\n2\n1\n0 0 0 0 0 0 0 0 0\n", "descending"),
            (b"7\n3\n", "missing size"),
            (b"7\n3\n0\n", "empty bucket"),
            (b"7\n3\n10\n", "over capacity"),
            (b"7\n3\n2\n0 0 0 0 0 0 0 0 0\n", "missing row"),
            (b"7\n3\n1\n0 0 0 0 0 0 0 0\n", "short row"),
            (b"7\n3\n1\n0 0 0 0 0 0 0 0 a\n", "bad number"),
        ];

        for (input, name) in cases {
            let mut input = *input;
            assert!(BucketTable::decode_from(&mut input).is_err(), "{name}");
        }
    }
}
