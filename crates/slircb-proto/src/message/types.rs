use std::str::FromStr;

use crate::chan::ChannelExt;
use crate::error::ParseError;
use crate::prefix::Prefix;

use super::parse::RawMessage;

/// An owned IRC message.
///
/// Holds the optional origin prefix, the command verb (uppercased) or
/// three-digit numeric, and the parameters with the trailing parameter as
/// an ordinary last element. Whether the trailing parameter was spelled
/// with a `:` on the wire is not recorded; serialization re-derives it.
///
/// # Example
///
/// ```
/// use slircb_proto::Message;
///
/// let msg: Message = ":nick!user@host PRIVMSG #channel :Hello!".parse().unwrap();
/// assert_eq!(msg.command, "PRIVMSG");
/// assert_eq!(msg.response_target(), Some("#channel"));
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct Message {
    /// Message origin (`nick!user@host` or server name), if present.
    pub prefix: Option<Prefix>,
    /// The command verb or numeric. Verbs are stored uppercased.
    pub command: String,
    /// Parameters, trailing included as the last element.
    pub params: Vec<String>,
}

impl Message {
    /// Create a message from a command and parameters.
    #[must_use]
    pub fn new(command: impl Into<String>, params: Vec<String>) -> Self {
        Message {
            prefix: None,
            command: command.into().to_ascii_uppercase(),
            params,
        }
    }

    /// Attach an origin prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Create a `PRIVMSG` to a target.
    #[must_use]
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Message::new("PRIVMSG", vec![target.into(), text.into()])
    }

    /// Create a `NOTICE` to a target.
    #[must_use]
    pub fn notice(target: impl Into<String>, text: impl Into<String>) -> Self {
        Message::new("NOTICE", vec![target.into(), text.into()])
    }

    /// Case-insensitive command comparison.
    pub fn command_is(&self, command: &str) -> bool {
        self.command.eq_ignore_ascii_case(command)
    }

    /// The nickname from the message prefix, if present.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }

    /// The appropriate target for a response.
    ///
    /// For a `PRIVMSG`/`NOTICE` to a channel this is the channel; for a
    /// direct message it is the sender's nickname. `None` when neither is
    /// available (e.g. a server numeric with no user prefix).
    pub fn response_target(&self) -> Option<&str> {
        if self.command_is("PRIVMSG") || self.command_is("NOTICE") {
            if let Some(target) = self.params.first() {
                if target.is_channel_name() {
                    return Some(target);
                }
            }
        }
        self.source_nickname()
    }

    /// The message text: the trailing parameter of a `PRIVMSG`/`NOTICE`.
    pub fn text(&self) -> Option<&str> {
        if self.command_is("PRIVMSG") || self.command_is("NOTICE") {
            self.params.last().map(String::as_str)
        } else {
            None
        }
    }
}

impl FromStr for Message {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = RawMessage::parse(s)?;
        Ok(Message {
            prefix: raw.prefix.map(Prefix::parse),
            command: raw.command.to_ascii_uppercase(),
            params: raw.params.iter().map(|p| (*p).to_string()).collect(),
        })
    }
}
