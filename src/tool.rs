// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! CLI tool for building and inspecting `.c4hash` bucket tables

use c4_hash::{BucketTable, Config, LogObserver, StateVector};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use humansize::{format_size, BINARY};
use std::path::{Path, PathBuf};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    prelude::*,
    registry::Registry,
};

macro_rules! die {
    ($fmt:literal, $($arg:tt)*) => {{
        eprintln!($fmt, $($arg)*);
        std::process::exit(1);
    }};

    ($msg:literal) => {{
        eprintln!($msg);
        std::process::exit(1);
    }};
}

#[allow(unused_imports)]
use tracing::{debug, error, info, trace, warn};

pub fn init_tracing(quiet: bool, verbose: u8) -> (bool, LevelFilter) {
    let is_verbose = !quiet && verbose > 0;

    let level_filter = if quiet {
        LevelFilter::ERROR
    } else {
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };

    // Bridge log crate macros to tracing (the library logs through `log`)
    tracing_log::LogTracer::init().expect("Failed to set log tracer");

    let registry = Registry::default();

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("C4HASH_LOG")
        .from_env_lossy();

    let subscriber = registry.with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .compact(),
    );

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        die!("INTERNAL ERROR: setting default tracing::subscriber failed");
    }

    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing_panic::panic_hook(info);
        prev_hook(info); // daisy-chain to old panic hook
    }));

    (is_verbose, level_filter)
}

/// CLI tool for building and inspecting `.c4hash` bucket tables
#[derive(Parser, Debug)]
#[command(name = "c4hash")]
#[command(about = "Builds a .c4hash bucket table from a .states file")]
struct ToolArgs {
    /// Suppress all output except for errors. This overrides the -v flag.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Turn on verbose output. Supply -v multiple times to increase verbosity.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Input file: a `.states` file, or a `.c4hash` table for subcommands
    path: PathBuf,

    /// Command to run (if omitted, builds the table for a `.states` file)
    #[command(subcommand)]
    command: Option<ToolCommand>,
}

#[derive(Subcommand, Debug, Clone)]
enum ToolCommand {
    /// Show bucket statistics of a `.c4hash` table
    Inspect,
    /// Look up a position given as a move string (columns 1 to 7)
    Lookup {
        /// Moves played so far, e.g. "4435"
        moves: String,
    },
}

fn build(path: &Path) -> c4_hash::Result<()> {
    let mut observer = LogObserver::default();
    let report = c4_hash::run(path, Config::new(), &mut observer)?;
    let stats = &report.stats;

    let size = std::fs::metadata(&report.output).map(|m| m.len()).unwrap_or_default();

    println!("Records: {}", report.records);
    println!("Insertions: {}", stats.insertions());
    println!("Rejected (bucket full): {}", stats.rejections());
    println!("Occupied buckets: {}", stats.occupied_buckets());
    match stats.max_bucket() {
        Some(bucket) => println!("Max collisions: {} (bucket {bucket})", stats.max_occupancy()),
        None => println!("Max collisions: 0"),
    }
    println!(
        "Output: {} ({})",
        report.output.display(),
        format_size(size, BINARY)
    );

    Ok(())
}

fn print_info(path: &Path, table: &BucketTable) {
    let stats = table.stats();

    let mut histogram = vec![0_usize; table.bucket_capacity() + 1];
    for (_, bucket) in table.iter() {
        if let Some(count) = histogram.get_mut(bucket.len()) {
            *count += 1;
        }
    }

    println!("Path: {}", path.display());
    println!("Modulus: {}", table.modulus());
    println!("States: {}", table.len());
    println!("Occupied buckets: {}", stats.occupied_buckets());
    if let Some(bucket) = stats.max_bucket() {
        println!("Max collisions: {} (bucket {bucket})", stats.max_occupancy());
    }
    for (size, count) in histogram.iter().enumerate().skip(1) {
        if *count > 0 {
            println!("  {size} per bucket: {count}");
        }
    }
}

fn lookup(table: &BucketTable, moves: &str) -> c4_hash::Result<()> {
    let query = StateVector::from_position(moves)?;
    let index = table.hasher().hash(&query);

    debug!("Position {moves:?} hashes to bucket {index}");

    match table.get(&query) {
        Some(state) => {
            let [ties, first, second] = state.results();
            println!("Found in bucket {index}: {state}");
            println!("Ties: {ties}, first player: {first}, second player: {second}");
        }
        None => println!("Not found (bucket {index})"),
    }

    Ok(())
}

fn execute(path: &Path, command: Option<ToolCommand>) -> c4_hash::Result<()> {
    let Some(command) = command else {
        return build(path);
    };

    let table = BucketTable::open(path)?;

    match command {
        ToolCommand::Inspect => print_info(path, &table),
        ToolCommand::Lookup { moves } => lookup(&table, &moves)?,
    }

    Ok(())
}

fn main() {
    let args = ToolArgs::parse();
    let (verbose, level_filter) = init_tracing(args.quiet, args.verbose);

    let cmd = ToolArgs::command();

    info!(
        "starting {} ({} {}), log level: {level_filter}",
        cmd.get_name(),
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = execute(&args.path, args.command) {
        let note = if verbose {
            ""
        } else {
            ". Note: Use -v (one or multiple times) for more information"
        };
        die!("Error: {}{}", e, note);
    }
}
