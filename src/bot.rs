//! The bot façade: assemble handlers, then run sessions.
//!
//! ```no_run
//! use slircb::{Bot, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut bot = Bot::new(Config::load("straybot.toml")?);
//! bot.on_trigger("!ping", |ctx| async move { ctx.reply("pong").await })?;
//! bot.run().await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::info;

use slircb_proto::encode;

use crate::config::Config;
use crate::conn::Connection;
use crate::dispatch::Dispatcher;
use crate::error::{ConnectionError, Incident, RegistrationError};
use crate::event::EventDescriptor;
use crate::handler::{Context, FnHandler, Handler, HandlerResult};
use crate::registry::Registry;
use crate::sched::{self, Scheduler};

/// Capacity of the system lane. Keepalive and registration traffic is
/// tiny; this only bounds pathological bursts.
const SYSTEM_LANE_CAPACITY: usize = 64;

/// Capacity of the incident broadcast. Slow subscribers lose the oldest
/// incidents rather than stalling the session.
const INCIDENT_CAPACITY: usize = 64;

/// An IRC bot: a configuration, an ordered set of handlers, and a
/// [`run`](Bot::run) loop that owns one session at a time.
///
/// Handlers register before the first run. `run` returns when the
/// session ends; callers that want reconnection loop it themselves.
pub struct Bot {
    config: Config,
    registry: Registry,
    stop_tx: mpsc::Sender<()>,
    stop_rx: mpsc::Receiver<()>,
    incidents: broadcast::Sender<Incident>,
}

impl Bot {
    /// A bot with no handlers.
    pub fn new(config: Config) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel(1);
        let (incidents, _) = broadcast::channel(INCIDENT_CAPACITY);
        Bot {
            config,
            registry: Registry::new(),
            stop_tx,
            stop_rx,
            incidents,
        }
    }

    /// The configuration this bot runs with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A cloneable handle for stopping the bot and observing incidents.
    /// Valid before, during, and after `run`.
    pub fn handle(&self) -> BotHandle {
        BotHandle {
            stop_tx: self.stop_tx.clone(),
            incidents: self.incidents.clone(),
        }
    }

    /// Register a handler for a descriptor.
    ///
    /// Handlers matching the same event start in registration order.
    /// Fails with [`RegistrationError::Frozen`] once the bot has started.
    pub fn on<H>(
        &mut self,
        descriptor: EventDescriptor,
        handler: H,
    ) -> Result<(), RegistrationError>
    where
        H: Handler + 'static,
    {
        self.registry.register(descriptor, Arc::new(handler))
    }

    /// Register an async closure for a descriptor.
    pub fn on_fn<F, Fut>(
        &mut self,
        descriptor: EventDescriptor,
        f: F,
    ) -> Result<(), RegistrationError>
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.on(descriptor, FnHandler(f))
    }

    /// Register an async closure for every message with this command.
    pub fn on_command<F, Fut>(
        &mut self,
        command: impl Into<String>,
        f: F,
    ) -> Result<(), RegistrationError>
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.on_fn(EventDescriptor::command(command), f)
    }

    /// Register an async closure for a trigger word.
    pub fn on_trigger<F, Fut>(
        &mut self,
        pattern: impl Into<String>,
        f: F,
    ) -> Result<(), RegistrationError>
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.on_fn(EventDescriptor::trigger(pattern), f)
    }

    /// Register an async closure for the connected event.
    pub fn on_connected<F, Fut>(&mut self, f: F) -> Result<(), RegistrationError>
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.on_fn(EventDescriptor::connected(), f)
    }

    /// Register an async closure for the disconnected event.
    pub fn on_disconnected<F, Fut>(&mut self, f: F) -> Result<(), RegistrationError>
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.on_fn(EventDescriptor::disconnected(), f)
    }

    /// Run one session to completion.
    ///
    /// Connects, identifies, dispatches until the session ends (peer
    /// close, I/O failure, or a [`BotHandle::stop`]), then tears down and
    /// returns. Errors cover session establishment only; once the
    /// session is up, `run` ends with `Ok` however it ends.
    pub async fn run(&mut self) -> Result<(), ConnectionError> {
        let identify = encode(self.config.identity.identify_action(), None)?;
        let registry = self
            .registry
            .freeze(self.config.behavior.trigger_case_sensitive);

        // Stops sent before this run belong to no session.
        while self.stop_rx.try_recv().is_ok() {}

        let addr = self.config.server.addr();
        info!(server = %addr, nick = %self.config.identity.nick, "Connecting");
        let conn = Connection::open(&addr, self.config.server.connect_timeout()).await?;
        let (reader, writer) = conn.into_parts();

        let (system_tx, system_rx) = mpsc::channel(SYSTEM_LANE_CAPACITY);
        let (user_tx, user_rx) = sched::user_queue(self.config.scheduler.queue_bound);
        let scheduler = Scheduler::new(writer, system_rx, user_rx, &self.config.scheduler);
        let sched = tokio::spawn(scheduler.run());

        let dispatcher = Dispatcher::new(
            reader,
            registry,
            system_tx,
            user_tx,
            self.incidents.clone(),
            &mut self.stop_rx,
            &self.config.behavior,
        );
        dispatcher.run(identify, sched).await;

        info!("Session ended");
        Ok(())
    }
}

/// Cloneable handle onto a [`Bot`].
#[derive(Clone)]
pub struct BotHandle {
    stop_tx: mpsc::Sender<()>,
    incidents: broadcast::Sender<Incident>,
}

impl BotHandle {
    /// Request a graceful stop: QUIT goes out on the system lane and the
    /// session tears down. Idempotent; a no-op when no session is
    /// running.
    pub fn stop(&self) {
        let _ = self.stop_tx.try_send(());
    }

    /// Subscribe to the incident stream.
    pub fn incidents(&self) -> broadcast::Receiver<Incident> {
        self.incidents.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_bot() -> Bot {
        Bot::new(Config::for_server("127.0.0.1", 6667, "testbot"))
    }

    #[test]
    fn test_registration_accumulates_in_order() {
        let mut bot = test_bot();
        bot.on_command("PRIVMSG", |_ctx| async move { Ok(()) })
            .unwrap();
        bot.on_trigger("!echo", |_ctx| async move { Ok(()) })
            .unwrap();
        bot.on_connected(|_ctx| async move { Ok(()) }).unwrap();
        bot.on_disconnected(|_ctx| async move { Ok(()) }).unwrap();
        assert_eq!(bot.registry.len(), 4);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let bot = test_bot();
        let handle = bot.handle();
        handle.stop();
        handle.stop();
        handle.stop();
    }

    #[test]
    fn test_handle_survives_bot_drop() {
        let bot = test_bot();
        let handle = bot.handle();
        drop(bot);
        handle.stop();
        let mut incidents = handle.incidents();
        assert!(incidents.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_run_rejects_unencodable_identity() {
        let mut config = Config::for_server("127.0.0.1", 6667, "testbot");
        config.identity.nick = "bad nick".to_string();
        let mut bot = Bot::new(config);
        let err = bot.run().await.unwrap_err();
        assert!(matches!(err, ConnectionError::Identity(_)));
    }
}
