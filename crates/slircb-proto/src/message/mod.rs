//! IRC message parsing and serialization.
//!
//! The wire format, per RFC 1459/2812:
//!
//! ```text
//! [:prefix] <command> [params...] [:trailing]
//! ```
//!
//! [`Message`] is the owned representation; parsing goes through
//! [`str::parse`] and serialization through [`Display`](std::fmt::Display).

mod parse;
mod serialize;
mod types;

pub use self::types::Message;
