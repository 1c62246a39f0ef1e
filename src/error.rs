// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::coding::{DecodeError, EncodeError};

/// Represents errors that can occur while building or reading a bucket table
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(std::io::Error),

    /// Serialization failed
    Encode(EncodeError),

    /// Deserialization failed
    Decode(DecodeError),

    /// A `.states` line could not be parsed into a state vector
    MalformedRecord {
        /// 1-based line number in the input file
        line: usize,

        /// What was wrong with the line
        reason: String,
    },

    /// A move string does not describe a legal position
    InvalidPosition(String),

    /// Bucket index is not in `[0, modulus)`
    IndexOutOfRange {
        /// Offending index
        index: usize,

        /// Table modulus
        modulus: usize,
    },

    /// Configuration value is not usable (e.g. modulus of 0)
    InvalidConfig(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "C4HashError(Io: {e})"),
            Self::Encode(e) => write!(f, "C4HashError({e})"),
            Self::Decode(e) => write!(f, "C4HashError({e})"),
            Self::MalformedRecord { line, reason } => {
                write!(f, "C4HashError(MalformedRecord at line {line}: {reason})")
            }
            e => write!(f, "C4HashError: {e:?}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Encode(e) => Some(e),
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<EncodeError> for Error {
    fn from(value: EncodeError) -> Self {
        Self::Encode(value)
    }
}

impl From<DecodeError> for Error {
    fn from(value: DecodeError) -> Self {
        Self::Decode(value)
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(value: tempfile::PersistError) -> Self {
        Self::Io(value.error)
    }
}

/// Bucket table result
pub type Result<T> = std::result::Result<T, Error>;
