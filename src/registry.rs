//! Handler registry.
//!
//! Registrations accumulate in order while the bot is being assembled.
//! The first run freezes the registry into an immutable snapshot the
//! dispatcher matches against without locking; registration attempts
//! after that point fail with [`RegistrationError::Frozen`].

use std::sync::Arc;

use crate::error::RegistrationError;
use crate::event::{Event, EventDescriptor};
use crate::handler::Handler;

/// One registered handler and the descriptor that selects it.
#[derive(Clone)]
pub struct HandlerBinding {
    /// What this handler subscribed to.
    pub descriptor: EventDescriptor,
    /// The handler itself.
    pub handler: Arc<dyn Handler>,
}

/// Ordered collection of handler bindings.
#[derive(Default)]
pub struct Registry {
    bindings: Vec<HandlerBinding>,
    frozen: bool,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Registry::default()
    }

    /// Append a binding. Order is preserved: handlers matching the same
    /// event are started in registration order.
    pub fn register(
        &mut self,
        descriptor: EventDescriptor,
        handler: Arc<dyn Handler>,
    ) -> Result<(), RegistrationError> {
        if self.frozen {
            return Err(RegistrationError::Frozen);
        }
        self.bindings.push(HandlerBinding {
            descriptor,
            handler,
        });
        Ok(())
    }

    /// Number of registered bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no bindings are registered.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Snapshot the bindings for dispatch and reject registrations from
    /// here on. The snapshot is cheap: bindings hold their handlers in
    /// [`Arc`]s.
    pub fn freeze(&mut self, trigger_case_sensitive: bool) -> FrozenRegistry {
        self.frozen = true;
        FrozenRegistry {
            bindings: self.bindings.clone(),
            trigger_case_sensitive,
        }
    }
}

/// Immutable registry snapshot used by the dispatcher.
pub struct FrozenRegistry {
    bindings: Vec<HandlerBinding>,
    trigger_case_sensitive: bool,
}

impl FrozenRegistry {
    /// Bindings matching an event, in registration order.
    pub fn matches<'a>(
        &'a self,
        event: &'a Event,
    ) -> impl Iterator<Item = &'a HandlerBinding> {
        self.bindings
            .iter()
            .filter(move |b| self.binding_matches(&b.descriptor, event))
    }

    /// Number of bindings in the snapshot.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the snapshot holds no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn binding_matches(&self, descriptor: &EventDescriptor, event: &Event) -> bool {
        match (descriptor, event) {
            (EventDescriptor::Lifecycle(l), event) => event.lifecycle() == Some(*l),
            (EventDescriptor::Command(cmd), Event::Message(msg)) => msg.command_is(cmd),
            (EventDescriptor::Trigger { pattern }, Event::Message(msg)) => {
                if !msg.command_is("PRIVMSG") || msg.response_target().is_none() {
                    return false;
                }
                let Some(text) = msg.text() else {
                    return false;
                };
                let Some(first) = text.split_whitespace().next() else {
                    return false;
                };
                if self.trigger_case_sensitive {
                    first == pattern
                } else {
                    first.eq_ignore_ascii_case(pattern)
                }
            }
            _ => false,
        }
    }
}
