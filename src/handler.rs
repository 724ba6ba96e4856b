//! Handler trait and execution context.
//!
//! Handlers implement [`Handler`] (or are wrapped closures via
//! [`FnHandler`]) and receive an owned [`Context`] per execution. The
//! context carries the matched event and an [`Outbox`] that encodes
//! actions eagerly and queues the resulting lines on the user lane.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use slircb_proto::{encode, Action, Message};

use crate::error::{HandlerError, SendError};
use crate::event::Event;
use crate::sched::QueueTx;

/// Outcome of one handler execution.
pub type HandlerResult = Result<(), HandlerError>;

/// An event handler.
///
/// Executions run as independent tasks: a slow, failing, or panicking
/// handler never affects other handlers or the session itself.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle one matched event.
    async fn handle(&self, ctx: Context) -> HandlerResult;
}

/// Adapter implementing [`Handler`] for async closures.
///
/// ```no_run
/// use slircb::{FnHandler, Handler};
///
/// let handler = FnHandler(|ctx: slircb::Context| async move {
///     ctx.reply("pong!").await
/// });
/// ```
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    async fn handle(&self, ctx: Context) -> HandlerResult {
        (self.0)(ctx).await
    }
}

/// Per-execution context handed to a handler.
#[derive(Clone)]
pub struct Context {
    /// The event that matched this handler's descriptor.
    pub event: Event,
    outbox: Outbox,
}

impl Context {
    pub(crate) fn new(event: Event, outbox: Outbox) -> Self {
        Context { event, outbox }
    }

    /// The inbound message, when the event carries one.
    pub fn message(&self) -> Option<&Message> {
        self.event.message().map(Arc::as_ref)
    }

    /// Message text (the trailing of a PRIVMSG or NOTICE).
    pub fn text(&self) -> Option<&str> {
        self.message().and_then(Message::text)
    }

    /// Nick of the message sender, when known.
    pub fn sender_nick(&self) -> Option<&str> {
        self.message().and_then(Message::source_nickname)
    }

    /// Text after the trigger word, with surrounding whitespace trimmed.
    ///
    /// `!echo  hello world` gives `Some("hello world")`; a bare trigger
    /// gives `Some("")`; a non-message event gives `None`.
    pub fn args(&self) -> Option<&str> {
        let text = self.text()?;
        let trimmed = text.trim_start();
        match trimmed.find(char::is_whitespace) {
            Some(idx) => Some(trimmed[idx..].trim()),
            None => Some(""),
        }
    }

    /// The outbox for this execution.
    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Encode and queue an action.
    pub async fn send(&self, action: Action) -> Result<(), HandlerError> {
        self.outbox.send(action).await
    }

    /// Queue a reply to the origin message.
    ///
    /// Shorthand for sending [`Action::Reply`]; fails with
    /// [`EncodeError::NoReplyTarget`](slircb_proto::EncodeError) when the
    /// event has no origin with a resolvable target.
    pub async fn reply(&self, text: impl Into<String>) -> Result<(), HandlerError> {
        self.outbox.send(Action::reply(text)).await
    }
}

/// Queues encoded lines for the outbound user lane.
///
/// Encoding happens here, at emit time, so an invalid action surfaces to
/// the handler that produced it rather than poisoning the writer. Lines
/// from one execution keep their emit order on the wire; pacing and lane
/// priority are the scheduler's business.
#[derive(Clone)]
pub struct Outbox {
    queue: QueueTx,
    origin: Option<Arc<Message>>,
}

impl Outbox {
    pub(crate) fn new(queue: QueueTx, origin: Option<Arc<Message>>) -> Self {
        Outbox { queue, origin }
    }

    /// Encode an action and queue its lines.
    ///
    /// Waits when the user lane is bounded and full; lines are never
    /// dropped. Fails fast with [`SendError::Closed`] once the session
    /// writer is gone.
    pub async fn send(&self, action: Action) -> Result<(), HandlerError> {
        let lines = encode(action, self.origin.as_deref())?;
        for line in lines {
            self.queue
                .send(line)
                .await
                .map_err(|_| HandlerError::Send(SendError::Closed))?;
        }
        Ok(())
    }
}
