//! IRC message prefix types.
//!
//! A prefix identifies the origin of a message: either a server name or a
//! user's `nick!user@host` mask.
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format

use std::fmt;
use std::str::FromStr;

/// The origin of an IRC message.
///
/// Servers identify themselves by name; users by `nick!user@host`, where
/// the user and host parts may be absent.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Prefix {
    /// Server name (e.g. `irc.example.com`).
    ServerName(String),
    /// User prefix: (nickname, username, hostname). Missing parts are
    /// stored as empty strings.
    Nickname(String, String, String),
}

impl Prefix {
    /// Parse a prefix string leniently.
    ///
    /// A string without `!` or `@` that contains a dot is taken to be a
    /// server name; everything else is a user prefix with whatever parts
    /// are present.
    pub fn parse(s: &str) -> Self {
        if let Some(at) = s.find('@') {
            let (before, host) = (&s[..at], &s[at + 1..]);
            let (nick, user) = match before.find('!') {
                Some(bang) => (&before[..bang], &before[bang + 1..]),
                None => (before, ""),
            };
            return Prefix::Nickname(nick.into(), user.into(), host.into());
        }
        if let Some(bang) = s.find('!') {
            let (nick, user) = (&s[..bang], &s[bang + 1..]);
            return Prefix::Nickname(nick.into(), user.into(), String::new());
        }
        if s.contains('.') {
            Prefix::ServerName(s.into())
        } else {
            Prefix::Nickname(s.into(), String::new(), String::new())
        }
    }

    /// Create a user prefix from nick, user, and host components.
    pub fn new(nick: impl Into<String>, user: impl Into<String>, host: impl Into<String>) -> Self {
        Prefix::Nickname(nick.into(), user.into(), host.into())
    }

    /// The nickname, if this is a user prefix with a non-empty nick.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(nick, _, _) if !nick.is_empty() => Some(nick),
            _ => None,
        }
    }

    /// The username, if this is a user prefix with a non-empty user part.
    pub fn user(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(_, user, _) if !user.is_empty() => Some(user),
            _ => None,
        }
    }

    /// The hostname: the server name itself, or the host part of a user
    /// prefix.
    pub fn host(&self) -> Option<&str> {
        match self {
            Prefix::ServerName(name) => Some(name),
            Prefix::Nickname(_, _, host) if !host.is_empty() => Some(host),
            _ => None,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => f.write_str(name),
            Prefix::Nickname(nick, user, host) => {
                f.write_str(nick)?;
                if !user.is_empty() {
                    write!(f, "!{}", user)?;
                }
                if !host.is_empty() {
                    write!(f, "@{}", host)?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Prefix {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Prefix::parse(s))
    }
}

impl From<&str> for Prefix {
    fn from(s: &str) -> Self {
        Prefix::parse(s)
    }
}
