//! Bot configuration.
//!
//! Loaded from a TOML file with [`Config::load`], or built in code for
//! embedding and tests. Every field outside `[server]`/`[identity]` has
//! a default, so a minimal config is just a host and a nick.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use slircb_proto::Action;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the TOML content.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server to connect to.
    pub server: ServerConfig,
    /// Who the bot presents itself as.
    pub identity: IdentityConfig,
    /// Session behavior knobs.
    #[serde(default)]
    pub behavior: BehaviorConfig,
    /// Outbound scheduling knobs.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Minimal in-code configuration: everything not named here takes
    /// its default.
    pub fn for_server(
        host: impl Into<String>,
        port: u16,
        nick: impl Into<String>,
    ) -> Self {
        Config {
            server: ServerConfig {
                host: host.into(),
                port,
                connect_timeout_secs: default_connect_timeout(),
            },
            identity: IdentityConfig {
                nick: nick.into(),
                user: String::new(),
                realname: String::new(),
                password: String::new(),
            },
            behavior: BehaviorConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server hostname or address.
    pub host: String,
    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// TCP connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl ServerConfig {
    /// Address in `host:port` form.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// `[identity]` section.
///
/// `user` and `realname` fall back to the nick when left empty; an empty
/// `password` means no PASS line is sent.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Nickname to register with.
    pub nick: String,
    /// Username for the USER line.
    #[serde(default)]
    pub user: String,
    /// Realname for the USER line.
    #[serde(default)]
    pub realname: String,
    /// Connection password, sent as PASS before NICK.
    #[serde(default)]
    pub password: String,
}

impl IdentityConfig {
    /// The registration exchange this identity describes.
    pub fn identify_action(&self) -> Action {
        let user = if self.user.is_empty() {
            self.nick.clone()
        } else {
            self.user.clone()
        };
        let realname = if self.realname.is_empty() {
            self.nick.clone()
        } else {
            self.realname.clone()
        };
        let password = if self.password.is_empty() {
            None
        } else {
            Some(self.password.clone())
        };
        Action::Identify {
            nick: self.nick.clone(),
            user,
            realname,
            password,
        }
    }
}

/// `[behavior]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BehaviorConfig {
    /// Command (usually the 001 numeric) that marks registration as
    /// complete and fires the connected event.
    #[serde(default = "default_ready_command")]
    pub ready_command: String,
    /// Channels joined automatically once registration completes.
    #[serde(default)]
    pub channels: Vec<String>,
    /// Whether trigger words match case-sensitively.
    #[serde(default)]
    pub trigger_case_sensitive: bool,
    /// Reason carried on the QUIT sent by a requested stop.
    #[serde(default = "default_quit_reason")]
    pub quit_reason: String,
    /// How long shutdown waits for in-flight handlers and the outbound
    /// queue before aborting them, in seconds.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

impl BehaviorConfig {
    /// Shutdown grace as a [`Duration`].
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        BehaviorConfig {
            ready_command: default_ready_command(),
            channels: Vec::new(),
            trigger_case_sensitive: false,
            quit_reason: default_quit_reason(),
            shutdown_grace_secs: default_shutdown_grace(),
        }
    }
}

/// `[scheduler]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Minimum spacing between paced lines, in milliseconds. Zero
    /// disables pacing entirely.
    #[serde(default = "default_min_send_interval")]
    pub min_send_interval_ms: u64,
    /// How many paced lines may go out back to back before the spacing
    /// kicks in.
    #[serde(default = "default_burst")]
    pub burst: u32,
    /// Capacity of the user-lane queue. Zero means unbounded.
    #[serde(default)]
    pub queue_bound: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            min_send_interval_ms: default_min_send_interval(),
            burst: default_burst(),
            queue_bound: 0,
        }
    }
}

// =============================================================================
// Default Values
// =============================================================================

fn default_port() -> u16 {
    6667
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_ready_command() -> String {
    "001".to_string()
}

fn default_quit_reason() -> String {
    "bye".to_string()
}

fn default_shutdown_grace() -> u64 {
    5
}

fn default_min_send_interval() -> u64 {
    500
}

fn default_burst() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_config() {
        let toml = r#"
            [server]
            host = "irc.example.com"

            [identity]
            nick = "straybot"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "irc.example.com");
        assert_eq!(config.server.port, 6667);
        assert_eq!(config.server.connect_timeout_secs, 30);
        assert_eq!(config.identity.nick, "straybot");
        assert_eq!(config.behavior.ready_command, "001");
        assert!(config.behavior.channels.is_empty());
        assert!(!config.behavior.trigger_case_sensitive);
        assert_eq!(config.behavior.quit_reason, "bye");
        assert_eq!(config.behavior.shutdown_grace_secs, 5);
        assert_eq!(config.scheduler.min_send_interval_ms, 500);
        assert_eq!(config.scheduler.burst, 1);
        assert_eq!(config.scheduler.queue_bound, 0);
    }

    #[test]
    fn test_full_config() {
        let toml = r##"
            [server]
            host = "127.0.0.1"
            port = 6697
            connect_timeout_secs = 10

            [identity]
            nick = "straybot"
            user = "stray"
            realname = "Straylight Bot"
            password = "hunter2"

            [behavior]
            ready_command = "376"
            channels = ["#straylight", "#bots"]
            trigger_case_sensitive = true
            quit_reason = "gone"
            shutdown_grace_secs = 2

            [scheduler]
            min_send_interval_ms = 250
            burst = 4
            queue_bound = 128
        "##;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.addr(), "127.0.0.1:6697");
        assert_eq!(config.server.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.identity.user, "stray");
        assert_eq!(config.behavior.ready_command, "376");
        assert_eq!(
            config.behavior.channels,
            vec!["#straylight".to_string(), "#bots".to_string()]
        );
        assert!(config.behavior.trigger_case_sensitive);
        assert_eq!(config.behavior.shutdown_grace(), Duration::from_secs(2));
        assert_eq!(config.scheduler.min_send_interval_ms, 250);
        assert_eq!(config.scheduler.burst, 4);
        assert_eq!(config.scheduler.queue_bound, 128);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[server]\nhost = \"localhost\"\n\n[identity]\nnick = \"bot\"\n"
        )
        .unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.identity.nick, "bot");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/straybot.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[server\nhost = oops").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_identify_action_fallbacks() {
        let identity = IdentityConfig {
            nick: "stray".to_string(),
            user: String::new(),
            realname: String::new(),
            password: String::new(),
        };
        let action = identity.identify_action();
        assert_eq!(
            action,
            Action::Identify {
                nick: "stray".to_string(),
                user: "stray".to_string(),
                realname: "stray".to_string(),
                password: None,
            }
        );
    }

    #[test]
    fn test_identify_action_explicit() {
        let identity = IdentityConfig {
            nick: "stray".to_string(),
            user: "u".to_string(),
            realname: "Stray Light".to_string(),
            password: "s3cret".to_string(),
        };
        let action = identity.identify_action();
        assert_eq!(
            action,
            Action::Identify {
                nick: "stray".to_string(),
                user: "u".to_string(),
                realname: "Stray Light".to_string(),
                password: Some("s3cret".to_string()),
            }
        );
    }

    #[test]
    fn test_for_server() {
        let config = Config::for_server("127.0.0.1", 6667, "bot");
        assert_eq!(config.server.addr(), "127.0.0.1:6667");
        assert_eq!(config.identity.nick, "bot");
        assert_eq!(config.scheduler.min_send_interval_ms, 500);
    }
}
