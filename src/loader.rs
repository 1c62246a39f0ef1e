// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::state::StateVector;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    time::{Duration, Instant},
};

/// Receives progress notifications while a state file is loaded.
///
/// All methods default to doing nothing.
pub trait LoadObserver {
    /// Called once the number of lines of the input is known.
    fn on_start(&mut self, _total_lines: usize) {}

    /// Called after every parsed record (1-based count).
    fn on_record(&mut self, _count: usize) {}

    /// Called after the last record was parsed.
    fn on_finish(&mut self, _count: usize, _elapsed: Duration) {}
}

/// Observer that ignores every notification
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopObserver;

impl LoadObserver for NoopObserver {}

/// Observer that reports progress through the `log` facade
#[derive(Clone, Debug)]
pub struct LogObserver {
    total: usize,
    interval: usize,
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new(1_000_000)
    }
}

impl LogObserver {
    /// Creates an observer that logs every `interval` records.
    #[must_use]
    pub fn new(interval: usize) -> Self {
        Self {
            total: 0,
            interval: interval.max(1),
        }
    }
}

impl LoadObserver for LogObserver {
    fn on_start(&mut self, total_lines: usize) {
        self.total = total_lines;
        log::info!("Loading {total_lines} states");
    }

    fn on_record(&mut self, count: usize) {
        if count % self.interval == 0 {
            log::debug!("Loaded {count}/{} states", self.total);
        }
    }

    fn on_finish(&mut self, count: usize, elapsed: Duration) {
        log::info!("Loaded {count} states in {:.2}s", elapsed.as_secs_f64());
    }
}

/// Lazily parses `.states` lines in file order
///
/// Stops at the first malformed line; the error carries its line number.
pub struct StateReader<R: BufRead> {
    reader: R,
    buf: String,
    line: usize,
    failed: bool,
}

impl<R: BufRead> StateReader<R> {
    /// Wraps a line-oriented reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line: 0,
            failed: false,
        }
    }

    /// Number of lines consumed so far.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }
}

impl StateReader<BufReader<File>> {
    /// Opens a state file.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn open<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for StateReader<R> {
    type Item = crate::Result<StateVector>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        self.buf.clear();

        match self.reader.read_line(&mut self.buf) {
            Ok(0) => return None,
            Ok(_) => {}
            Err(e) => {
                self.failed = true;
                return Some(Err(e.into()));
            }
        }

        self.line += 1;

        let state = StateVector::parse(&self.buf, self.line);
        self.failed = state.is_err();

        Some(state)
    }
}

/// Counts the lines of a file, including an unterminated last line.
fn count_lines(path: &Path) -> crate::Result<usize> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut count = 0;
    let mut last = None;

    loop {
        let buf = reader.fill_buf()?;

        if buf.is_empty() {
            break;
        }

        count += buf.iter().filter(|&&b| b == b'\n').count();
        last = buf.last().copied();

        let len = buf.len();
        reader.consume(len);
    }

    if last.is_some_and(|b| b != b'\n') {
        count += 1;
    }

    Ok(count)
}

/// Loads every state of a `.states` file in file order.
///
/// # Errors
///
/// Returns [`crate::Error::MalformedRecord`] for the first line that does
/// not parse, or `Err` if an IO error occurs. Nothing is returned on error.
pub fn load_states<P: AsRef<Path>, O: LoadObserver + ?Sized>(
    path: P,
    observer: &mut O,
) -> crate::Result<Vec<StateVector>> {
    let path = path.as_ref();
    let start = Instant::now();

    let total = count_lines(path)?;
    observer.on_start(total);

    let mut states = Vec::with_capacity(total);

    for state in StateReader::open(path)? {
        states.push(state?);
        observer.on_record(states.len());
    }

    observer.on_finish(states.len(), start.elapsed());

    Ok(states)
}
