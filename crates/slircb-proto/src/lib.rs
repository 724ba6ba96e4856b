//! # slircb-proto
//!
//! IRC client protocol support for the slircb bot engine: message parsing
//! and serialization, action encoding with reply-target resolution and
//! length-aware splitting, and a tokio line codec.
//!
//! ## Parsing
//!
//! ```rust
//! use slircb_proto::Message;
//!
//! let msg: Message = ":nick!user@host PRIVMSG #channel :Hello!".parse().unwrap();
//! assert_eq!(msg.command, "PRIVMSG");
//! assert_eq!(msg.params, vec!["#channel", "Hello!"]);
//! assert_eq!(msg.response_target(), Some("#channel"));
//! ```
//!
//! ## Encoding actions
//!
//! ```rust
//! use slircb_proto::{encode, Action, Message};
//!
//! let origin: Message = ":alice!a@h PRIVMSG #rust :!hi".parse().unwrap();
//! let lines = encode(Action::reply("hello alice"), Some(&origin)).unwrap();
//! assert_eq!(lines, vec!["PRIVMSG #rust :hello alice"]);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod action;
pub mod chan;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod prefix;

pub use self::action::{encode, Action, MAX_LINE_LEN};
pub use self::chan::ChannelExt;
pub use self::error::{EncodeError, ParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use self::line::{LineCodec, MAX_INBOUND_LEN};
pub use self::message::Message;
pub use self::prefix::Prefix;
