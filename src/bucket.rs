// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::state::StateVector;

/// Position of a state inside its bucket
pub type Slot = usize;

/// The bucket already holds as many states as it can
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BucketFull;

impl std::fmt::Display for BucketFull {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BucketFull")
    }
}

/// Outcome of inserting a state
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[must_use]
pub enum InsertResult {
    /// State was stored at the given slot
    Inserted(Slot),

    /// State was dropped
    Rejected(BucketFull),
}

impl InsertResult {
    /// Returns `true` if the state was stored.
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// A group of colliding states
///
/// States keep their insertion order; no slot is ever reused.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Bucket {
    // NOTE: Empty Vecs do not allocate, so an untouched bucket is free
    states: Vec<StateVector>,
}

impl Bucket {
    /// Number of stored states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if no state is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Stored states in insertion order.
    #[must_use]
    pub fn states(&self) -> &[StateVector] {
        &self.states
    }

    /// Returns the stored state describing the same board, if any.
    #[must_use]
    pub fn find(&self, state: &StateVector) -> Option<&StateVector> {
        self.states.iter().find(|s| s.same_position(state))
    }

    pub(crate) fn push(&mut self, state: StateVector, capacity: usize) -> InsertResult {
        if self.states.len() >= capacity {
            return InsertResult::Rejected(BucketFull);
        }

        let slot = self.states.len();
        self.states.push(state);
        InsertResult::Inserted(slot)
    }
}
