//! Configuration for the responder server and the initiator client.
//!
//! Both halves live in one TOML file:
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 5555
//! idle_timeout_secs = 30
//!
//! [client]
//! host = "127.0.0.1"
//! port = 5555
//! reply_timeout_secs = 5
//! name = "Ada"
//! ```

use crate::error::ConfigError;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5555
}

fn default_idle_timeout_secs() -> u64 {
    30
}

fn default_reply_timeout_secs() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    10
}

fn default_games() -> u32 {
    1
}

/// Responder settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,

    /// Seconds to wait for the next opcode before dropping a connection.
    #[serde(default = "default_idle_timeout_secs")]
    idle_timeout_secs: u64,
}

impl ServerConfig {
    /// Idle read deadline per connection.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Applies command-line overrides.
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

/// Initiator settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Responder host.
    #[serde(default = "default_host")]
    host: String,

    /// Responder port.
    #[serde(default = "default_port")]
    port: u16,

    /// Seconds to wait for each reply.
    #[serde(default = "default_reply_timeout_secs")]
    reply_timeout_secs: u64,

    /// Times a rejected `Hello` or `Play` is resent before giving up.
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,

    /// Player name; prompted for when absent.
    #[serde(default)]
    name: Option<String>,

    /// Games the automated player plays before disconnecting.
    #[serde(default = "default_games")]
    games: u32,
}

impl ClientConfig {
    /// Reply deadline for each request.
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs)
    }

    /// Applies command-line overrides.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        name: Option<String>,
        games: Option<u32>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if name.is_some() {
            self.name = name;
        }
        if let Some(games) = games {
            self.games = games;
        }
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            reply_timeout_secs: default_reply_timeout_secs(),
            max_attempts: default_max_attempts(),
            name: None,
            games: default_games(),
        }
    }
}

/// Whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct NoughtsConfig {
    /// `[server]` table.
    #[serde(default)]
    server: ServerConfig,

    /// `[client]` table.
    #[serde(default)]
    client: ClientConfig,
}

impl NoughtsConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!("Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns defaults.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Splits into the server and client halves.
    pub fn into_parts(self) -> (ServerConfig, ClientConfig) {
        (self.server, self.client)
    }
}
