//! Dispatchable events and the descriptors that select them.

use std::fmt;
use std::sync::Arc;

use slircb_proto::Message;

/// Session lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Registration completed; the server accepted the bot.
    Connected,
    /// The session ended, for any reason.
    Disconnected,
}

/// An occurrence the dispatcher fans out to matching handlers.
///
/// Messages are shared behind an [`Arc`] so every matching handler sees
/// the same parse without copying it.
#[derive(Debug, Clone)]
pub enum Event {
    /// Registration completed. Fired at most once per session.
    Connected,
    /// The session ended. Fired exactly once per session.
    Disconnected,
    /// An inbound server message.
    Message(Arc<Message>),
}

impl Event {
    /// The inbound message, when this is a message event.
    pub fn message(&self) -> Option<&Arc<Message>> {
        match self {
            Event::Message(msg) => Some(msg),
            _ => None,
        }
    }

    pub(crate) fn lifecycle(&self) -> Option<LifecycleEvent> {
        match self {
            Event::Connected => Some(LifecycleEvent::Connected),
            Event::Disconnected => Some(LifecycleEvent::Disconnected),
            Event::Message(_) => None,
        }
    }
}

/// What a handler subscribes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDescriptor {
    /// A lifecycle transition.
    Lifecycle(LifecycleEvent),
    /// Any message with this command. Stored uppercased; matching is
    /// case-insensitive either way.
    Command(String),
    /// A PRIVMSG whose first word equals this pattern and whose reply
    /// target resolves. Case sensitivity comes from
    /// [`BehaviorConfig::trigger_case_sensitive`](crate::config::BehaviorConfig).
    Trigger {
        /// The word that arms the trigger, e.g. `!echo`.
        pattern: String,
    },
}

impl EventDescriptor {
    /// Descriptor for a command subscription.
    pub fn command(command: impl Into<String>) -> Self {
        EventDescriptor::Command(command.into().to_ascii_uppercase())
    }

    /// Descriptor for a trigger-word subscription.
    pub fn trigger(pattern: impl Into<String>) -> Self {
        EventDescriptor::Trigger {
            pattern: pattern.into(),
        }
    }

    /// Descriptor for the connected lifecycle event.
    pub fn connected() -> Self {
        EventDescriptor::Lifecycle(LifecycleEvent::Connected)
    }

    /// Descriptor for the disconnected lifecycle event.
    pub fn disconnected() -> Self {
        EventDescriptor::Lifecycle(LifecycleEvent::Disconnected)
    }
}

impl fmt::Display for EventDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventDescriptor::Lifecycle(LifecycleEvent::Connected) => {
                write!(f, "connected")
            }
            EventDescriptor::Lifecycle(LifecycleEvent::Disconnected) => {
                write!(f, "disconnected")
            }
            EventDescriptor::Command(cmd) => write!(f, "command {cmd}"),
            EventDescriptor::Trigger { pattern } => write!(f, "trigger {pattern}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_descriptor_uppercases() {
        assert_eq!(
            EventDescriptor::command("privmsg"),
            EventDescriptor::Command("PRIVMSG".to_string())
        );
    }

    #[test]
    fn test_lifecycle_mapping() {
        assert_eq!(Event::Connected.lifecycle(), Some(LifecycleEvent::Connected));
        assert_eq!(
            Event::Disconnected.lifecycle(),
            Some(LifecycleEvent::Disconnected)
        );
        let msg: Message = "PING :x".parse().unwrap();
        assert_eq!(Event::Message(Arc::new(msg)).lifecycle(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(EventDescriptor::connected().to_string(), "connected");
        assert_eq!(
            EventDescriptor::command("join").to_string(),
            "command JOIN"
        );
        assert_eq!(
            EventDescriptor::trigger("!echo").to_string(),
            "trigger !echo"
        );
    }
}
