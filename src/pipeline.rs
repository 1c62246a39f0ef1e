// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    file::hash_file_path,
    loader::{load_states, LoadObserver},
    stats::InsertStats,
    BucketTable, Config, StateVector,
};
use std::path::{Path, PathBuf};

/// Summary of a finished run
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Report {
    /// Path of the written bucket table
    pub output: PathBuf,

    /// Number of records read from the state file
    pub records: usize,

    /// Collision statistics of the written table
    pub stats: InsertStats,
}

/// Hashes and inserts states in iteration order.
///
/// States whose bucket is already full are dropped and counted in
/// [`BucketTable::stats`].
///
/// # Errors
///
/// Returns error if the config is not usable.
pub fn build_table<I: IntoIterator<Item = StateVector>>(
    config: Config,
    states: I,
) -> crate::Result<BucketTable> {
    let mut table = config.build()?;

    for state in states {
        let _ = table.insert_state(state);
    }

    let stats = table.stats();

    log::info!(
        "Inserted {} of {} states, max {} per bucket (bucket {:?})",
        stats.insertions(),
        stats.offered(),
        stats.max_occupancy(),
        stats.max_bucket(),
    );

    if stats.has_rejections() {
        log::warn!(
            "Dropped {} states because their bucket was full (capacity {})",
            stats.rejections(),
            table.bucket_capacity(),
        );
    }

    Ok(table)
}

/// Loads a `.states` file, builds its bucket table and writes it next to
/// the input with the `.c4hash` extension.
///
/// # Errors
///
/// Will return `Err` if an IO error occurs or a record is malformed. In
/// that case no output file is created.
pub fn run<P: AsRef<Path>, O: LoadObserver + ?Sized>(
    input: P,
    config: Config,
    observer: &mut O,
) -> crate::Result<Report> {
    let input = input.as_ref();

    let states = load_states(input, observer)?;
    let records = states.len();

    let table = build_table(config, states)?;

    let output = hash_file_path(input);
    table.save(&output)?;

    Ok(Report {
        output,
        records,
        stats: table.stats().clone(),
    })
}
