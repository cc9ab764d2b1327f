//! Library error types.
use std::fmt;

use serde::{de, ser};

/// A tuple-layer `Result`, normally returning a tuple-layer [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A tuple-layer error. Encompasses everything that can go wrong while
/// packing a value, parsing a byte string, or narrowing a decoded value to
/// a smaller type.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The byte string isn't a valid tuple encoding: truncated input, a bad
    /// escape sequence, an unknown tag, or invalid UTF-8 inside a unicode
    /// string segment.
    MalformedTuple {
        /// Byte offset into the input at which the problem was found.
        offset: usize,
        /// Human-readable description of what went wrong.
        reason: String,
    },
    /// A numeric decode failed to fit into the requested destination type,
    /// or an integer payload claimed a width wider than 8 bytes.
    Overflow {
        /// Byte offset of the element that overflowed.
        offset: usize,
    },
    /// Indexed tuple access beyond the tuple's length. This is a
    /// programmer error, not a decode failure.
    OutOfRange {
        /// The index that was requested.
        index: usize,
        /// The tuple's actual length.
        len: usize,
    },
    /// The encoder was asked to pack a runtime value with no registered
    /// codec.
    Unsupported {
        /// Name of the unsupported type, for diagnostics only.
        type_name: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MalformedTuple { offset, reason } => {
                write!(f, "malformed tuple at byte offset {}: {}", offset, reason)
            }
            Error::Overflow { offset } => {
                write!(f, "numeric overflow decoding element at byte offset {}", offset)
            }
            Error::OutOfRange { index, len } => {
                write!(f, "index {} out of range for tuple of length {}", index, len)
            }
            Error::Unsupported { type_name } => {
                write!(f, "no tuple-layer codec registered for type `{}`", type_name)
            }
        }
    }
}

impl std::error::Error for Error {}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::MalformedTuple {
            offset: 0,
            reason: msg.to_string(),
        }
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::MalformedTuple {
            offset: 0,
            reason: msg.to_string(),
        }
    }
}
