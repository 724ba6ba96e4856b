//! straybot - a small bot built on the slircb engine.
//!
//! Joins its configured channels, echoes on demand, follows invites,
//! and quits when asked.

use slircb::{Action, Bot, Config, HandlerError};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "straybot.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        server = %config.server.addr(),
        nick = %config.identity.nick,
        "Starting straybot"
    );

    let mut bot = Bot::new(config);
    let handle = bot.handle();

    bot.on_connected(|_ctx| async move {
        info!("Ready for commands");
        Ok(())
    })?;

    bot.on_trigger("!echo", |ctx| async move {
        match ctx.args() {
            Some("") | None => ctx.reply("usage: !echo <text>").await,
            Some(args) => {
                let text = args.to_string();
                ctx.reply(text).await
            }
        }
    })?;

    bot.on_trigger("!quit", move |ctx| {
        let handle = handle.clone();
        async move {
            let who = ctx.sender_nick().unwrap_or("someone").to_string();
            info!(nick = %who, "Quit requested");
            ctx.reply("bye").await?;
            handle.stop();
            Ok(())
        }
    })?;

    // Follow invites: INVITE <nick> <channel>
    bot.on_command("INVITE", |ctx| async move {
        let channel = ctx
            .message()
            .and_then(|msg| msg.params.get(1))
            .cloned()
            .ok_or_else(|| HandlerError::failed("INVITE without a channel"))?;
        info!(channel = %channel, "Following invite");
        ctx.send(Action::join([channel])).await
    })?;

    bot.on_disconnected(|_ctx| async move {
        warn!("Session over");
        Ok(())
    })?;

    bot.run().await?;
    Ok(())
}
