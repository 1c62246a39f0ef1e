// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use std::io::{BufRead, Write};

/// Error during serialization
#[derive(Debug)]
pub enum EncodeError {
    /// I/O error
    Io(std::io::Error),
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "EncodeError(Io: {e})"),
        }
    }
}

impl From<std::io::Error> for EncodeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
        }
    }
}

/// Error during deserialization
#[derive(Debug)]
pub enum DecodeError {
    /// I/O error
    Io(std::io::Error),

    /// First line is missing or not a usable modulus
    InvalidHeader(&'static str),

    /// Input ended in the middle of a bucket
    UnexpectedEof {
        /// 1-based line number that was expected
        line: usize,
    },

    /// Token is not a base-10 integer
    InvalidNumber {
        /// 1-based line number
        line: usize,

        /// Offending token
        token: String,
    },

    /// Bucket section violates the table layout
    InvalidBucket {
        /// 1-based line number
        line: usize,

        /// Which rule was broken
        reason: &'static str,
    },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DecodeError({})",
            match self {
                Self::Io(e) => e.to_string(),
                Self::InvalidNumber { line, token } => {
                    format!("InvalidNumber: {token:?} at line {line}")
                }
                Self::InvalidBucket { line, reason } => {
                    format!("InvalidBucket: {reason} at line {line}")
                }
                e => format!("{e:?}"),
            }
        )
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Trait to serialize stuff
pub trait Encode {
    /// Serializes into writer.
    fn encode_into<W: Write>(&self, writer: &mut W) -> Result<(), EncodeError>;

    /// Serializes into vector.
    #[allow(unused)]
    fn encode_into_vec(&self) -> Vec<u8> {
        let mut v = vec![];

        // NOTE: Writing into a Vec cannot fail
        #[allow(clippy::expect_used)]
        self.encode_into(&mut v).expect("cannot fail");

        v
    }
}

/// Trait to deserialize stuff
pub trait Decode {
    /// Deserializes from a line-oriented reader.
    fn decode_from<R: BufRead>(reader: &mut R) -> Result<Self, DecodeError>
    where
        Self: Sized;
}

/// Reads lines one at a time while keeping track of the line number.
pub(crate) struct LineCursor<'a, R: BufRead> {
    reader: &'a mut R,
    buf: String,
    line: usize,
}

impl<'a, R: BufRead> LineCursor<'a, R> {
    pub fn new(reader: &'a mut R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line: 0,
        }
    }

    /// Line number of the last line returned by [`LineCursor::next_line`].
    pub fn line(&self) -> usize {
        self.line
    }

    fn advance(&mut self) -> Result<bool, DecodeError> {
        self.buf.clear();

        if self.reader.read_line(&mut self.buf)? == 0 {
            return Ok(false);
        }

        self.line += 1;
        Ok(true)
    }

    /// Returns the next line without its terminator, or `None` at end of input.
    pub fn next_line(&mut self) -> Result<Option<&str>, DecodeError> {
        if !self.advance()? {
            return Ok(None);
        }

        Ok(Some(self.buf.trim_end_matches(['\n', '\r'])))
    }

    /// Parses the next line as a single integer.
    pub fn next_number<T: std::str::FromStr>(&mut self) -> Result<Option<T>, DecodeError> {
        if !self.advance()? {
            return Ok(None);
        }

        let token = self.buf.trim();

        token
            .parse::<T>()
            .map(Some)
            .map_err(|_| DecodeError::InvalidNumber {
                line: self.line,
                token: token.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn cursor_counts_lines() -> Result<(), DecodeError> {
        let mut input: &[u8] = b"7\r\nabc\n12";
        let mut cursor = LineCursor::new(&mut input);

        assert_eq!(Some(7), cursor.next_number::<usize>()?);
        assert_eq!(1, cursor.line());

        assert!(matches!(
            cursor.next_number::<usize>(),
            Err(DecodeError::InvalidNumber { line: 2, .. })
        ));

        assert_eq!(Some("12"), cursor.next_line()?);
        assert_eq!(None, cursor.next_line()?);
        assert_eq!(3, cursor.line());

        Ok(())
    }
}
