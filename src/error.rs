//! Engine error types.
//!
//! Each enum maps to one fate: `ConnectionError` is fatal to a run,
//! `SendError` tears the session down through the disconnect path,
//! `RegistrationError` rejects late registrations, and `HandlerError`
//! stays inside the one handler execution that produced it.

use std::time::Duration;

use slircb_proto::{EncodeError, ProtocolError};
use thiserror::Error;

/// Failure to establish a session. Fatal to [`Bot::run`](crate::Bot::run).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConnectionError {
    /// TCP connect (or name resolution) failed.
    #[error("connect to {addr} failed: {source}")]
    Connect {
        /// Address in `host:port` form.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The connect attempt did not complete in time.
    #[error("connect to {addr} timed out after {timeout:?}")]
    Timeout {
        /// Address in `host:port` form.
        addr: String,
        /// The configured timeout.
        timeout: Duration,
    },

    /// The configured identity cannot be encoded into a registration
    /// exchange (empty nick, whitespace in the username, and the like).
    #[error("identity is not encodable: {0}")]
    Identity(#[from] EncodeError),
}

/// Failure to put a line on the wire. Ends the session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SendError {
    /// The writer task is gone; the session is over.
    #[error("connection closed")]
    Closed,

    /// The socket write failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProtocolError> for SendError {
    fn from(e: ProtocolError) -> Self {
        match e {
            ProtocolError::Io(io) => SendError::Io(io),
            other => SendError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                other.to_string(),
            )),
        }
    }
}

/// Rejected handler registration.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistrationError {
    /// The registry was frozen because the bot has started running.
    #[error("registry is frozen: the bot has already started")]
    Frozen,
}

/// Failure inside a single handler execution.
///
/// Never affects other executions or the session; reported on the
/// incident stream and via logging.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HandlerError {
    /// An emitted action could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// The outbound queue is gone (session ending).
    #[error("send error: {0}")]
    Send(#[from] SendError),

    /// Handler-specific failure.
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    /// Construct a handler-specific failure from any message.
    pub fn failed(msg: impl Into<String>) -> Self {
        HandlerError::Failed(msg.into())
    }
}

/// A non-fatal runtime event published on the incident stream.
///
/// Everything here is also logged; the stream exists so embedding code
/// can observe failures without scraping logs. Delivery is best-effort:
/// slow subscribers lose the oldest entries.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Incident {
    /// An inbound line failed to parse and was skipped.
    SkippedLine {
        /// The offending line.
        line: String,
        /// Why it was skipped.
        error: String,
    },
    /// Inbound data was dropped before line parsing (oversize, bad UTF-8).
    DroppedInput {
        /// The codec error.
        error: String,
    },
    /// A handler returned an error.
    HandlerFailed {
        /// Which binding the handler was registered under.
        descriptor: String,
        /// The error it returned.
        error: String,
    },
    /// A handler panicked.
    HandlerPanicked {
        /// The panic description from the join error.
        error: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            RegistrationError::Frozen.to_string(),
            "registry is frozen: the bot has already started"
        );
        assert_eq!(
            HandlerError::failed("no such user").to_string(),
            "no such user"
        );
        assert_eq!(SendError::Closed.to_string(), "connection closed");
    }

    #[test]
    fn test_encode_error_propagates() {
        let err: HandlerError = EncodeError::NoReplyTarget.into();
        assert!(matches!(err, HandlerError::Encode(_)));
        assert_eq!(err.to_string(), "encode error: no reply target available");
    }

    #[test]
    fn test_protocol_error_to_send_error() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: SendError = ProtocolError::Io(io).into();
        assert!(matches!(err, SendError::Io(_)));
    }
}
