//! Configuration module - environment variable parsing

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::util::time::MAX_FRAME_RATE;

/// Default game server host when neither SERVER_URL nor SERVER_HOST is set
pub const DEFAULT_SERVER_HOST: &str = "localhost:8000";

/// Client socket path on the game server
pub const CLIENT_WS_PATH: &str = "/ws/client";

/// Client configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Full WebSocket URL of the client endpoint
    pub server_url: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Pilot name used when `join` is issued without one
    pub player_name: Option<String>,

    /// Fixed delay before each reconnection attempt
    pub reconnect_delay: Duration,
    /// Render loop ticks per second
    pub frame_rate: u32,
    /// Where the latest video frame is written (memory only when unset)
    pub frame_output: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // SERVER_URL wins, otherwise derive the client endpoint from the host
        let server_url = match lookup("SERVER_URL") {
            Some(url) => url,
            None => {
                let host = lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string());
                format!("ws://{}{}", host, CLIENT_WS_PATH)
            }
        };

        if !(server_url.starts_with("ws://") || server_url.starts_with("wss://")) {
            return Err(ConfigError::InvalidUrl(server_url));
        }

        let reconnect_ms = parse_number(&lookup, "RECONNECT_DELAY_MS", 2000)?;
        let frame_rate = u32::try_from(parse_number(&lookup, "FRAME_RATE", 60)?)
            .ok()
            .filter(|rate| (1..=MAX_FRAME_RATE).contains(rate))
            .ok_or(ConfigError::Invalid("FRAME_RATE"))?;

        Ok(Self {
            server_url,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            player_name: lookup("PLAYER_NAME").filter(|name| !name.trim().is_empty()),
            reconnect_delay: Duration::from_millis(reconnect_ms),
            frame_rate,
            frame_output: lookup("FRAME_OUTPUT").map(PathBuf::from),
        })
    }
}

fn parse_number<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Server URL must use ws:// or wss://, got {0}")]
    InvalidUrl(String),
}
