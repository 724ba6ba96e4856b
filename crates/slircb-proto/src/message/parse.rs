//! Nom-based IRC line parser.
//!
//! Parses a single line (already stripped of CR-LF by the codec, though
//! stray terminators are tolerated) into borrowed components. The owned
//! [`Message`](super::Message) type is built from these in `types.rs`.

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space0},
    combinator::opt,
    error::ErrorKind,
    sequence::preceded,
    IResult,
};
use smallvec::SmallVec;

use crate::error::ParseError;

/// Parse the message prefix (the part after `:` and before the first space).
fn parse_prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

/// Parse the command name (`1*letter` or `3digit`, RFC 2812).
fn parse_command(input: &str) -> IResult<&str, &str> {
    let (rest, cmd) = take_while1(|c: char| c.is_alphanumeric())(input)?;

    let all_letters = cmd.chars().all(|c| c.is_ascii_alphabetic());
    let three_digits = cmd.len() == 3 && cmd.chars().all(|c| c.is_ascii_digit());

    if all_letters || three_digits {
        Ok((rest, cmd))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::AlphaNumeric,
        )))
    }
}

/// Collect parameters from the remainder of the line.
///
/// Middle parameters are space-separated and may not contain spaces; the
/// first ` :` starts the trailing parameter, which runs to the end of the
/// line and may be empty. Runs of spaces between parameters are treated as
/// one separator.
fn parse_params(input: &str) -> SmallVec<[&str; 15]> {
    let mut params: SmallVec<[&str; 15]> = SmallVec::new();
    let mut rest = input;

    while rest.as_bytes().first() == Some(&b' ') {
        while rest.as_bytes().first() == Some(&b' ') {
            rest = &rest[1..];
        }
        if rest.is_empty() || rest.starts_with('\r') || rest.starts_with('\n') {
            break;
        }

        if let Some(trailing) = rest.strip_prefix(':') {
            let end = trailing.find(['\r', '\n']).unwrap_or(trailing.len());
            params.push(&trailing[..end]);
            break;
        }

        let end = rest.find([' ', '\r', '\n']).unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    params
}

/// A parsed line with borrowed string slices.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawMessage<'a> {
    /// Prefix string without the leading `:`, if present.
    pub prefix: Option<&'a str>,
    /// The command name as written on the wire.
    pub command: &'a str,
    /// Parameters, trailing included as the last element.
    pub params: SmallVec<[&'a str; 15]>,
}

fn parse_line_inner(input: &str) -> IResult<&str, RawMessage<'_>> {
    let (input, _) = space0(input)?;
    let (input, prefix) = opt(parse_prefix)(input)?;
    let (input, _) = space0(input)?;
    let (input, command) = parse_command(input)?;
    let params = parse_params(input);

    Ok((
        "",
        RawMessage {
            prefix,
            command,
            params,
        },
    ))
}

impl<'a> RawMessage<'a> {
    /// Parse one IRC line into borrowed components.
    pub fn parse(input: &'a str) -> Result<Self, ParseError> {
        if input.trim_matches([' ', '\r', '\n']).is_empty() {
            return Err(ParseError::Empty);
        }
        match parse_line_inner(input) {
            Ok((_, msg)) => Ok(msg),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                Err(ParseError::InvalidCommand {
                    line: input.to_string(),
                    position: input.len() - e.input.len(),
                })
            }
            Err(nom::Err::Incomplete(_)) => Err(ParseError::InvalidCommand {
                line: input.to_string(),
                position: input.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_command() {
        let msg = RawMessage::parse("PING").unwrap();
        assert_eq!(msg.command, "PING");
        assert!(msg.prefix.is_none());
        assert!(msg.params.is_empty());
    }

    #[test]
    fn test_parse_with_trailing() {
        let msg = RawMessage::parse("PRIVMSG #channel :Hello, world!").unwrap();
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params.as_slice(), &["#channel", "Hello, world!"]);
    }

    #[test]
    fn test_parse_with_prefix() {
        let msg = RawMessage::parse(":nick!user@host PRIVMSG #channel :Hello").unwrap();
        assert_eq!(msg.prefix, Some("nick!user@host"));
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params.as_slice(), &["#channel", "Hello"]);
    }

    #[test]
    fn test_parse_with_crlf() {
        let msg = RawMessage::parse("PING :server\r\n").unwrap();
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.params.as_slice(), &["server"]);
    }

    #[test]
    fn test_parse_multiple_params() {
        let msg = RawMessage::parse("USER guest 0 * :Real Name").unwrap();
        assert_eq!(msg.command, "USER");
        assert_eq!(msg.params.as_slice(), &["guest", "0", "*", "Real Name"]);
    }

    #[test]
    fn test_parse_numeric() {
        let msg = RawMessage::parse(":irc.example.net 001 me :Welcome").unwrap();
        assert_eq!(msg.prefix, Some("irc.example.net"));
        assert_eq!(msg.command, "001");
        assert_eq!(msg.params.as_slice(), &["me", "Welcome"]);
    }

    #[test]
    fn test_parse_empty_trailing() {
        let msg = RawMessage::parse("PRIVMSG #channel :").unwrap();
        assert_eq!(msg.params.as_slice(), &["#channel", ""]);
    }

    #[test]
    fn test_parse_space_trailing() {
        let msg = RawMessage::parse("TOPIC #chan : ").unwrap();
        assert_eq!(msg.params.as_slice(), &["#chan", " "]);
    }

    #[test]
    fn test_parse_consecutive_spaces() {
        let msg = RawMessage::parse("JOIN   #a").unwrap();
        assert_eq!(msg.params.as_slice(), &["#a"]);
    }

    #[test]
    fn test_parse_colon_inside_trailing() {
        let msg = RawMessage::parse("PRIVMSG #c :see: this").unwrap();
        assert_eq!(msg.params.as_slice(), &["#c", "see: this"]);
    }

    #[test]
    fn test_command_validation() {
        assert!(RawMessage::parse("PING").is_ok());
        assert!(RawMessage::parse("001").is_ok());

        assert!(RawMessage::parse("PING123").is_err());
        assert!(RawMessage::parse("12").is_err());
        assert!(RawMessage::parse("1234").is_err());
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(RawMessage::parse(""), Err(ParseError::Empty));
        assert_eq!(RawMessage::parse("   "), Err(ParseError::Empty));
        assert_eq!(RawMessage::parse("\r\n"), Err(ParseError::Empty));
    }

    #[test]
    fn test_many_params_tolerated() {
        // More than the RFC's 15-parameter shape still parses; every token
        // becomes a param.
        let raw = "CMD p1 p2 p3 p4 p5 p6 p7 p8 p9 p10 p11 p12 p13 p14 p15 p16";
        let msg = RawMessage::parse(raw).unwrap();
        assert_eq!(msg.params.len(), 16);
        assert_eq!(msg.params[15], "p16");
    }
}
