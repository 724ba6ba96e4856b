//! Error types for the wire layer.
//!
//! Parsing, encoding, and codec failures are kept in separate enums because
//! they are handled differently: parse failures are skipped and reported,
//! encode failures go back to the code that produced the action, and codec
//! failures either end the session (I/O) or drop a single line (decode).

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Transport and codec level errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid UTF-8 bytes in an inbound line.
    #[error("invalid UTF-8 at byte {byte_pos}: {details}")]
    InvalidUtf8 {
        /// Byte position where UTF-8 validation failed.
        byte_pos: usize,
        /// Detailed error message from the UTF-8 decoder.
        details: String,
    },

    /// Line exceeded the maximum allowed length.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    MessageTooLong {
        /// Actual line length.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },
}

/// Errors encountered when parsing an inbound IRC line.
///
/// These are never fatal to a session: the engine reports the offending
/// line and moves on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// Line was empty or contained only whitespace.
    #[error("empty message")]
    Empty,

    /// The command token was missing or not `1*letter` / `3digit`.
    #[error("invalid command at position {position}: {line:?}")]
    InvalidCommand {
        /// The offending input line.
        line: String,
        /// Byte position where parsing failed.
        position: usize,
    },
}

/// Errors encountered when encoding an [`Action`](crate::Action) into wire
/// lines.
///
/// Returned to the code that emitted the action; the connection is
/// unaffected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodeError {
    /// A reply action had no origin message with a resolvable target.
    #[error("no reply target available")]
    NoReplyTarget,

    /// A join or part action named no channels.
    #[error("channel list is empty")]
    EmptyChannels,

    /// The action reduced to an empty wire line.
    #[error("empty line")]
    EmptyLine,

    /// A parameter that must be a single clean token (target, nick,
    /// channel, ping token) was empty, contained whitespace where none is
    /// allowed, or contained line terminators.
    #[error("invalid target: {0:?}")]
    InvalidTarget(String),

    /// A single line would exceed the wire limit even after splitting.
    #[error("line too long: {len} bytes (limit: {limit})")]
    LineTooLong {
        /// Length of the offending line, including CR-LF.
        len: usize,
        /// Maximum allowed length.
        limit: usize,
    },
}
