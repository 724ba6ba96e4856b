//! # slircb
//!
//! Straylight IRC Bot: an async client-side dispatch engine.
//!
//! The engine owns one session at a time: it connects, identifies,
//! parses inbound traffic, and fans events out to registered handlers,
//! each running as its own task. Outbound actions are encoded eagerly
//! and scheduled over two lanes, so keepalive never queues behind
//! handler chatter and user traffic honors a minimum send spacing.
//!
//! ```no_run
//! use slircb::{Bot, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut bot = Bot::new(Config::load("straybot.toml")?);
//!
//!     bot.on_trigger("!ping", |ctx| async move { ctx.reply("pong").await })?;
//!     bot.on_connected(|_ctx| async move {
//!         tracing::info!("ready");
//!         Ok(())
//!     })?;
//!
//!     bot.run().await?;
//!     Ok(())
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod bot;
pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod registry;

mod conn;
mod dispatch;
mod sched;

pub use bot::{Bot, BotHandle};
pub use config::{
    BehaviorConfig, Config, ConfigError, IdentityConfig, SchedulerConfig, ServerConfig,
};
pub use error::{ConnectionError, HandlerError, Incident, RegistrationError, SendError};
pub use event::{Event, EventDescriptor, LifecycleEvent};
pub use handler::{Context, FnHandler, Handler, HandlerResult, Outbox};
pub use registry::{FrozenRegistry, HandlerBinding, Registry};

pub use slircb_proto::{
    encode, Action, EncodeError, Message, ParseError, Prefix, MAX_LINE_LEN,
};
