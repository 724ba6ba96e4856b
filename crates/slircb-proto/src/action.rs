//! Bot actions and their wire encoding.
//!
//! Handlers emit [`Action`]s rather than raw lines. Encoding resolves the
//! reply target from the triggering message, validates single-token fields,
//! and splits message text so every emitted line fits the 512-byte wire
//! limit once the codec adds CR-LF.

use crate::error::EncodeError;
use crate::message::Message;

/// Maximum length of a wire line in bytes, CR-LF included.
pub const MAX_LINE_LEN: usize = 512;

/// An outbound operation a handler can request.
///
/// One action may encode to several wire lines (long text is split, and
/// [`Action::Identify`] covers the whole registration exchange).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Register with the server: `PASS` (if set), `NICK`, `USER`.
    Identify {
        /// Nickname to request.
        nick: String,
        /// Username for the `USER` command.
        user: String,
        /// Realname (may contain spaces).
        realname: String,
        /// Connection password, if the server requires one.
        password: Option<String>,
    },
    /// Join one or more channels.
    Join {
        /// Channels to join; must be non-empty.
        channels: Vec<String>,
    },
    /// Part one or more channels.
    Part {
        /// Channels to part; must be non-empty.
        channels: Vec<String>,
    },
    /// Send a `PRIVMSG` to a channel or nick.
    PrivMsg {
        /// Destination channel or nick.
        target: String,
        /// Message text; split across lines as needed.
        text: String,
    },
    /// Send a `NOTICE` to a channel or nick.
    Notice {
        /// Destination channel or nick.
        target: String,
        /// Message text; split across lines as needed.
        text: String,
    },
    /// Send a `PRIVMSG` back to wherever the triggering message came from:
    /// the channel it was seen on, or the sender directly.
    Reply {
        /// Message text; split across lines as needed.
        text: String,
    },
    /// Answer a server `PING`.
    Pong {
        /// The token from the `PING`, echoed back verbatim.
        token: String,
    },
    /// Disconnect from the server.
    Quit {
        /// Optional parting reason.
        reason: Option<String>,
    },
    /// A raw wire line, sent as-is after CR/LF stripping.
    Raw {
        /// The line, without terminator.
        line: String,
    },
}

impl Action {
    /// Send a `PRIVMSG` to a channel or nick.
    #[must_use]
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Action::PrivMsg {
            target: target.into(),
            text: text.into(),
        }
    }

    /// Send a `NOTICE` to a channel or nick.
    #[must_use]
    pub fn notice(target: impl Into<String>, text: impl Into<String>) -> Self {
        Action::Notice {
            target: target.into(),
            text: text.into(),
        }
    }

    /// Reply to the triggering message.
    #[must_use]
    pub fn reply(text: impl Into<String>) -> Self {
        Action::Reply { text: text.into() }
    }

    /// Join the given channels.
    #[must_use]
    pub fn join<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Action::Join {
            channels: channels.into_iter().map(Into::into).collect(),
        }
    }

    /// Part the given channels.
    #[must_use]
    pub fn part<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Action::Part {
            channels: channels.into_iter().map(Into::into).collect(),
        }
    }

    /// Answer a `PING` with the given token.
    #[must_use]
    pub fn pong(token: impl Into<String>) -> Self {
        Action::Pong {
            token: token.into(),
        }
    }

    /// Disconnect with a reason.
    #[must_use]
    pub fn quit(reason: impl Into<String>) -> Self {
        Action::Quit {
            reason: Some(reason.into()),
        }
    }

    /// Send a raw wire line.
    #[must_use]
    pub fn raw(line: impl Into<String>) -> Self {
        Action::Raw { line: line.into() }
    }
}

/// Encode an action into wire lines, without CR-LF terminators.
///
/// `origin` is the message that triggered the emitting handler, if any;
/// it is consulted only by [`Action::Reply`]. Lines are returned in send
/// order and each fits [`MAX_LINE_LEN`] once the codec appends CR-LF.
pub fn encode(action: Action, origin: Option<&Message>) -> Result<Vec<String>, EncodeError> {
    match action {
        Action::Identify {
            nick,
            user,
            realname,
            password,
        } => {
            check_token(&nick)?;
            check_token(&user)?;
            if realname.contains(['\r', '\n', '\0']) {
                return Err(EncodeError::InvalidTarget(realname));
            }
            let mut lines = Vec::with_capacity(3);
            if let Some(pass) = password.filter(|p| !p.is_empty()) {
                if pass.contains(['\r', '\n', '\0']) {
                    return Err(EncodeError::InvalidTarget(pass));
                }
                lines.push(one_param("PASS", &pass));
            }
            lines.push(format!("NICK {nick}"));
            lines.push(format!("USER {user} 0 * :{realname}"));
            Ok(lines)
        }
        Action::Join { channels } => channel_list("JOIN", &channels),
        Action::Part { channels } => channel_list("PART", &channels),
        Action::PrivMsg { target, text } => message_lines("PRIVMSG", &target, &text),
        Action::Notice { target, text } => message_lines("NOTICE", &target, &text),
        Action::Reply { text } => {
            let target = origin
                .and_then(Message::response_target)
                .ok_or(EncodeError::NoReplyTarget)?;
            message_lines("PRIVMSG", target, &text)
        }
        Action::Pong { token } => {
            if token.contains(['\r', '\n', '\0']) {
                return Err(EncodeError::InvalidTarget(token));
            }
            Ok(vec![one_param("PONG", &token)])
        }
        Action::Quit { reason } => match reason {
            Some(reason) => {
                if reason.contains(['\r', '\n', '\0']) {
                    return Err(EncodeError::InvalidTarget(reason));
                }
                Ok(vec![one_param("QUIT", &reason)])
            }
            None => Ok(vec!["QUIT".to_string()]),
        },
        Action::Raw { line } => {
            let cleaned = line.replace(['\r', '\n'], "");
            if cleaned.trim().is_empty() {
                return Err(EncodeError::EmptyLine);
            }
            if cleaned.len() + 2 > MAX_LINE_LEN {
                return Err(EncodeError::LineTooLong {
                    len: cleaned.len() + 2,
                    limit: MAX_LINE_LEN,
                });
            }
            Ok(vec![cleaned])
        }
    }
}

/// Reject single-token fields (targets, nicks) that would corrupt the line.
fn check_token(token: &str) -> Result<(), EncodeError> {
    if token.is_empty()
        || token.starts_with(':')
        || token.contains([' ', '\r', '\n', '\0'])
    {
        return Err(EncodeError::InvalidTarget(token.to_string()));
    }
    Ok(())
}

/// Spell a one-parameter command, using trailing form when required.
fn one_param(verb: &str, param: &str) -> String {
    if param.is_empty() || param.contains(' ') || param.starts_with(':') {
        format!("{verb} :{param}")
    } else {
        format!("{verb} {param}")
    }
}

fn channel_list(verb: &str, channels: &[String]) -> Result<Vec<String>, EncodeError> {
    if channels.is_empty() {
        return Err(EncodeError::EmptyChannels);
    }
    for ch in channels {
        // Commas separate list entries, so they are forbidden inside one.
        if ch.is_empty() || ch.contains([' ', ',', '\r', '\n', '\0']) {
            return Err(EncodeError::InvalidTarget(ch.clone()));
        }
    }
    let line = format!("{} {}", verb, channels.join(","));
    if line.len() + 2 > MAX_LINE_LEN {
        return Err(EncodeError::LineTooLong {
            len: line.len() + 2,
            limit: MAX_LINE_LEN,
        });
    }
    Ok(vec![line])
}

/// Encode message text to one or more `<verb> <target> :<piece>` lines.
fn message_lines(verb: &str, target: &str, text: &str) -> Result<Vec<String>, EncodeError> {
    check_token(target)?;

    // "<verb> <target> :" plus the CR-LF the codec will add.
    let overhead = verb.len() + 1 + target.len() + 2 + 2;
    let budget = match MAX_LINE_LEN.checked_sub(overhead) {
        Some(b) if b > 0 => b,
        _ => {
            return Err(EncodeError::LineTooLong {
                len: overhead,
                limit: MAX_LINE_LEN,
            })
        }
    };

    let mut lines = Vec::new();
    for segment in text.split(['\r', '\n']) {
        if segment.is_empty() {
            continue;
        }
        for piece in split_text(segment, budget) {
            lines.push(format!("{verb} {target} :{piece}"));
        }
    }
    if lines.is_empty() {
        return Err(EncodeError::EmptyLine);
    }
    Ok(lines)
}

/// Split text into pieces of at most `budget` bytes, breaking at the last
/// whitespace run that fits. A single word longer than the budget is broken
/// at a character boundary. Seam whitespace is consumed by the split.
fn split_text(text: &str, budget: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = text;

    while rest.len() > budget {
        let window = floor_char_boundary(rest, budget);
        let mut cut = if rest[window..].starts_with(' ') {
            // The window ends exactly at a word boundary.
            window
        } else {
            match rest[..window].rfind(' ') {
                Some(idx) if idx > 0 => idx,
                _ => window,
            }
        };
        if cut == 0 {
            // Budget narrower than one character; take it anyway to make
            // progress.
            cut = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        let (piece, tail) = rest.split_at(cut);
        let piece = piece.trim_end_matches(' ');
        if !piece.is_empty() {
            pieces.push(piece);
        }
        rest = tail.trim_start_matches(' ');
    }

    if !rest.is_empty() {
        pieces.push(rest);
    }
    pieces
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}
