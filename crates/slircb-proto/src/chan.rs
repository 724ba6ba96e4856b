//! Channel name utilities.
//!
//! # Reference
//! - RFC 2812 Section 1.3: Channel names

/// Extension trait for checking whether a string names an IRC channel.
pub trait ChannelExt {
    /// Check if this string is a valid IRC channel name.
    ///
    /// Valid channel names start with `#`, `&`, `+`, or `!`, contain no
    /// space, comma, BEL, NUL, or other control characters, and are at most
    /// 50 characters long.
    fn is_channel_name(&self) -> bool;
}

impl ChannelExt for str {
    fn is_channel_name(&self) -> bool {
        if !self.starts_with(['#', '&', '+', '!']) {
            return false;
        }
        if self.chars().count() > 50 {
            return false;
        }
        !self
            .chars()
            .any(|c| c == ' ' || c == ',' || c == '\0' || c.is_control())
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }
}
