// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::Error;
use std::cmp::Ordering;

/// Number of fields in a state record
pub const STATE_LEN: usize = 10;

/// Number of board columns, each encoded as one cell value
pub const CELL_COUNT: usize = 7;

/// Number of fields written per state into a `.c4hash` table
pub const PERSISTED_LEN: usize = 9;

/// Number of rows per column
pub const ROW_COUNT: usize = 6;

/// Column cell values of a position
pub type Cells = [i32; CELL_COUNT];

/// One enumerated game state
///
/// The first [`CELL_COUNT`] fields encode one board column each
/// (base-3 digits, bottom piece is the lowest digit), the remaining
/// three fields are result counters (ties, first player wins, second
/// player wins) that play no part in hashing.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct StateVector([i32; STATE_LEN]);

impl From<[i32; STATE_LEN]> for StateVector {
    fn from(value: [i32; STATE_LEN]) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for StateVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fields = self.0.iter();

        if let Some(first) = fields.next() {
            write!(f, "{first}")?;
        }

        for field in fields {
            write!(f, " {field}")?;
        }

        Ok(())
    }
}

impl StateVector {
    /// Creates a state from column cells and result counters.
    #[must_use]
    pub fn from_parts(cells: Cells, results: [i32; 3]) -> Self {
        let mut fields = [0; STATE_LEN];

        for (field, value) in fields.iter_mut().zip(cells.into_iter().chain(results)) {
            *field = value;
        }

        Self(fields)
    }

    /// Creates a state from the fields stored in a `.c4hash` table.
    ///
    /// The last counter is not persisted and comes back as 0.
    #[must_use]
    pub fn from_persisted(persisted: [i32; PERSISTED_LEN]) -> Self {
        let mut fields = [0; STATE_LEN];

        for (field, value) in fields.iter_mut().zip(persisted) {
            *field = value;
        }

        Self(fields)
    }

    /// Parses a `.states` line.
    ///
    /// The line must hold at least [`STATE_LEN`] whitespace-separated
    /// integers; anything after that is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedRecord`] (tagged with `line_no`) if
    /// there are too few tokens or a token is not an integer.
    pub fn parse(line: &str, line_no: usize) -> crate::Result<Self> {
        let malformed = |reason: String| Error::MalformedRecord {
            line: line_no,
            reason,
        };

        let mut fields = [0; STATE_LEN];
        let mut tokens = line.split_ascii_whitespace();

        for (idx, field) in fields.iter_mut().enumerate() {
            let token = tokens
                .next()
                .ok_or_else(|| malformed(format!("expected {STATE_LEN} fields, found {idx}")))?;

            *field = token
                .parse()
                .map_err(|_| malformed(format!("field {} is not an integer: {token:?}", idx + 1)))?;
        }

        Ok(Self(fields))
    }

    /// Encodes a move sequence (column digits `1` to `7`) into a state
    /// with zeroed counters.
    ///
    /// Move `i` in column `c` adds `(i % 2 + 1) * 3^h` to cell `c`,
    /// where `h` is the number of pieces already in that column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPosition`] on a character that is not a
    /// column digit, or when a column would exceed [`ROW_COUNT`] pieces.
    pub fn from_position(moves: &str) -> crate::Result<Self> {
        let mut cells = [0; CELL_COUNT];
        let mut heights = [0u32; CELL_COUNT];

        for (ply, ch) in moves.chars().enumerate() {
            let column = ch
                .to_digit(10)
                .and_then(|d| (d as usize).checked_sub(1))
                .filter(|&c| c < CELL_COUNT)
                .ok_or_else(|| Error::InvalidPosition(format!("invalid column {ch:?} at move {ply}")))?;

            let (Some(cell), Some(height)) = (cells.get_mut(column), heights.get_mut(column)) else {
                return Err(Error::InvalidPosition(format!("invalid column {ch:?}")));
            };

            if *height as usize >= ROW_COUNT {
                return Err(Error::InvalidPosition(format!(
                    "column {ch} is full at move {ply}"
                )));
            }

            let player = if ply % 2 == 0 { 1 } else { 2 };
            *cell += player * 3_i32.pow(*height);
            *height += 1;
        }

        Ok(Self::from_parts(cells, [0; 3]))
    }

    /// Returns all fields.
    #[must_use]
    pub fn fields(&self) -> &[i32; STATE_LEN] {
        &self.0
    }

    /// Returns the column cells.
    #[must_use]
    pub fn cells(&self) -> Cells {
        let mut cells = [0; CELL_COUNT];

        for (cell, value) in cells.iter_mut().zip(self.0) {
            *cell = value;
        }

        cells
    }

    /// Returns the result counters (ties, first player wins, second player wins).
    #[must_use]
    pub fn results(&self) -> [i32; 3] {
        let mut results = [0; 3];

        for (result, value) in results.iter_mut().zip(self.0.into_iter().skip(CELL_COUNT)) {
            *result = value;
        }

        results
    }

    /// Returns the fields that are written into a `.c4hash` table.
    pub fn persisted(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.iter().copied().take(PERSISTED_LEN)
    }

    /// Returns `true` if both states describe the same board.
    #[must_use]
    pub fn same_position(&self, other: &Self) -> bool {
        self.cells() == other.cells()
    }

    /// Returns the left-right mirror image of this state.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        let mut cells = self.cells();
        cells.reverse();
        Self::from_parts(cells, self.results())
    }

    /// Folds this state and its mirror image into one representative.
    #[must_use]
    pub fn canonical(&self) -> Self {
        Self::from_parts(smaller_hash(self.cells()), self.results())
    }
}

/// Compares two cell vectors field by field.
///
/// Only the common prefix is compared, so vectors of different
/// length that agree on it are equal.
#[must_use]
pub fn compare_hashes(a: &[i32], b: &[i32]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.cmp(y))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Returns whichever of `cells` and its reverse compares smaller.
#[must_use]
pub fn smaller_hash(cells: Cells) -> Cells {
    let mut reversed = cells;
    reversed.reverse();

    if compare_hashes(&cells, &reversed).is_lt() {
        cells
    } else {
        reversed
    }
}
