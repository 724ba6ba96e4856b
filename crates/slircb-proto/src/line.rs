//! Line-based codec for tokio.
//!
//! Decodes newline-terminated lines into owned strings with the terminator
//! stripped, and encodes outbound lines by appending CR-LF. Inbound and
//! outbound limits differ: outbound is held to the wire limit, inbound is
//! generous so that an oversized server line costs one line, not the
//! session.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::action::MAX_LINE_LEN;
use crate::error::{self, ProtocolError};

/// Default cap on inbound lines, well above the nominal 512-byte limit.
pub const MAX_INBOUND_LEN: usize = 8192;

/// Codec for newline-terminated IRC lines.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of the next byte to check for a newline.
    next_index: usize,
    /// Set while skipping the remainder of an oversized line.
    discarding: bool,
    max_inbound: usize,
    max_outbound: usize,
}

impl LineCodec {
    /// Create a codec with the default limits.
    pub fn new() -> Self {
        Self::with_limits(MAX_INBOUND_LEN, MAX_LINE_LEN)
    }

    /// Create a codec with custom inbound/outbound length limits.
    pub fn with_limits(max_inbound: usize, max_outbound: usize) -> Self {
        Self {
            next_index: 0,
            discarding: false,
            max_inbound,
            max_outbound,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        if self.discarding {
            match src[..].iter().position(|b| *b == b'\n') {
                Some(offset) => {
                    src.advance(offset + 1);
                    self.discarding = false;
                    self.next_index = 0;
                }
                None => {
                    src.clear();
                    return Ok(None);
                }
            }
        }

        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let mut line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_inbound {
                return Err(ProtocolError::MessageTooLong {
                    actual: line.len(),
                    limit: self.max_inbound,
                });
            }

            line.truncate(line.len() - 1);
            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }

            let line = String::from_utf8(line.to_vec()).map_err(|e| {
                ProtocolError::InvalidUtf8 {
                    byte_pos: e.utf8_error().valid_up_to(),
                    details: e.utf8_error().to_string(),
                }
            })?;

            Ok(Some(line))
        } else {
            self.next_index = src.len();

            if src.len() > self.max_inbound {
                // Resynchronize at the next newline.
                let actual = src.len();
                src.clear();
                self.next_index = 0;
                self.discarding = true;
                return Err(ProtocolError::MessageTooLong {
                    actual,
                    limit: self.max_inbound,
                });
            }

            Ok(None)
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> error::Result<()> {
        if line.len() + 2 > self.max_outbound {
            return Err(ProtocolError::MessageTooLong {
                actual: line.len() + 2,
                limit: self.max_outbound,
            });
        }
        dst.reserve(line.len() + 2);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}
