//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::{
    default_max_backoff, default_max_retries, default_port, default_queue_capacity,
    default_read_idle, default_reconnect_delay, default_request_timeout,
};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Client configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server to connect to.
    pub server: ServerConfig,
    /// Who we are on the network.
    pub identity: IdentityConfig,
    /// Reconnect policy.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    /// Built-in handler toggles.
    #[serde(default)]
    pub features: FeaturesConfig,
    /// Read and request timeouts.
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
    /// Channels to join after registration (used by the binary).
    #[serde(default)]
    pub channels: Vec<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Minimal configuration for a plaintext connection; everything else
    /// takes its default.
    pub fn new(host: impl Into<String>, port: u16, nick: impl Into<String>) -> Self {
        let nick = nick.into();
        Self {
            server: ServerConfig {
                host: host.into(),
                port,
                ..Default::default()
            },
            identity: IdentityConfig {
                user: nick.clone(),
                nick,
                name: None,
            },
            ..Default::default()
        }
    }
}

/// Server endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Hostname or IP address.
    pub host: String,
    /// Port (default: 6667).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Connection password, sent as `PASS` before registration.
    pub password: Option<String>,
    /// TLS settings.
    #[serde(default)]
    pub tls: TlsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            password: None,
            tls: TlsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// `host:port`, as used for logging and socket connects.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Client-side TLS configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsConfig {
    /// Wrap the connection in TLS.
    #[serde(default)]
    pub enabled: bool,
    /// Name to verify the certificate against, when it differs from `host`.
    pub server_name: Option<String>,
}

/// Identity presented during registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityConfig {
    pub nick: String,
    pub user: String,
    /// Real name; defaults to `user`.
    pub name: Option<String>,
}

impl IdentityConfig {
    pub fn real_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.user)
    }
}

/// Reconnect policy.
///
/// After a transport failure the client waits `delay_secs`, then makes up to
/// `1 + max_retries` connection attempts with exponential backoff between
/// them. `max_retries = 0` disables reconnecting.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Initial delay in seconds; values below the default are raised to it.
    #[serde(default = "default_reconnect_delay")]
    pub delay_secs: u64,
    /// Cap for a single backoff wait, in seconds.
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delay_secs: default_reconnect_delay(),
            max_backoff_secs: default_max_backoff(),
        }
    }
}

impl ReconnectConfig {
    /// Initial delay with the floor applied.
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs.max(default_reconnect_delay()))
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs.max(self.delay().as_secs()))
    }
}

/// Toggles for groups of built-in handlers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeaturesConfig {
    /// Skip channel, user and mode tracking.
    #[serde(default)]
    pub disable_tracking: bool,
    /// Skip `RPL_ISUPPORT` option tracking.
    #[serde(default)]
    pub disable_cap_tracking: bool,
    /// Do not retry with a suffixed nickname on collisions.
    #[serde(default)]
    pub disable_nick_collision: bool,
}

/// Timeouts.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutsConfig {
    /// Seconds without any inbound line before the connection is considered
    /// dead.
    #[serde(default = "default_read_idle")]
    pub read_idle_secs: u64,
    /// Seconds a request/response exchange (e.g. WHOWAS) may wait.
    #[serde(default = "default_request_timeout")]
    pub request_secs: u64,
    /// Capacity of the inbound event queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            read_idle_secs: default_read_idle(),
            request_secs: default_request_timeout(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl TimeoutsConfig {
    pub fn read_idle(&self) -> Duration {
        Duration::from_secs(self.read_idle_secs)
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }
}
