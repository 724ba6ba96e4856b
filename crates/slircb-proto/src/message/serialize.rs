use std::fmt::{self, Display, Formatter};

use super::types::Message;

/// A parameter must be spelled as trailing (`:` prefixed) when it is empty,
/// contains a space, or itself starts with a colon.
fn needs_trailing(param: &str) -> bool {
    param.is_empty() || param.contains(' ') || param.starts_with(':')
}

impl Display for Message {
    /// Write the message in wire format, without the CR-LF terminator.
    ///
    /// The line codec appends the terminator; this keeps `to_string()`
    /// usable in logs and tests.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }

        f.write_str(&self.command)?;

        if let Some((last, middles)) = self.params.split_last() {
            for param in middles {
                write!(f, " {}", param)?;
            }
            if needs_trailing(last) {
                write!(f, " :{}", last)?;
            } else {
                write!(f, " {}", last)?;
            }
        }

        Ok(())
    }
}
