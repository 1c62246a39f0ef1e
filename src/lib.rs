// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A fixed-size bucket table for enumerated Connect-Four states.
//!
//! ##### About
//!
//! This crate turns a `.states` file (one position per line: seven column
//! cells followed by three result counters) into a `.c4hash` bucket table
//! that can be used to look up previously analyzed positions.
//!
//! Every state is hashed with a deterministic rolling hash over its
//! column cells and reduced into one of `modulus` buckets. Buckets hold a
//! small, fixed number of states; when a bucket is full, further states
//! for it are dropped and counted, never stored somewhere else. The table
//! size is fixed at construction.
//!
//! The hash is bit-for-bit stable across runs and platforms, so tables
//! written by one build can be read by another.
//!
//! ```
//! use c4_hash::{Config, StateVector};
//!
//! let mut table = Config::new().modulus(2_003).build()?;
//!
//! for line in ["1 0 0 0 0 0 0 3 1 0", "0 0 0 1 0 0 0 4 2 2"] {
//!     let state = StateVector::parse(line, 1)?;
//!     assert!(table.insert_state(state).is_inserted());
//! }
//!
//! let query = StateVector::from_position("4")?;
//! assert_eq!(Some([4, 2, 2]), table.get(&query).map(StateVector::results));
//! #
//! # Ok::<(), c4_hash::Error>(())
//! ```

#![deny(clippy::all, missing_docs, clippy::cargo)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![warn(clippy::multiple_crate_versions)]
#![allow(clippy::option_if_let_else)]
#![warn(clippy::redundant_feature_names)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod bucket;

#[doc(hidden)]
pub mod coding;

/// Configuration
pub mod config;

mod error;

#[doc(hidden)]
pub mod file;

/// Rolling hash and bucket reduction
pub mod hash;

/// Reading `.states` files
pub mod loader;

/// Batch processing of whole files
pub mod pipeline;

/// State vectors and mirror canonicalization
pub mod state;

mod stats;
mod table;

pub use {
    bucket::{Bucket, BucketFull, InsertResult, Slot},
    coding::{Decode, DecodeError, Encode, EncodeError},
    config::Config,
    error::{Error, Result},
    file::{hash_file_path, HASH_EXTENSION, STATES_EXTENSION},
    hash::{BucketHasher, BucketIndex},
    loader::{load_states, LoadObserver, LogObserver, NoopObserver, StateReader},
    pipeline::{build_table, run, Report},
    state::StateVector,
    stats::InsertStats,
    table::BucketTable,
};
