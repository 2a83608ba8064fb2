#![deny(unsafe_code)]

//! Configuration loading and validation for ipfsbridge.
//!
//! Loads TOML configuration files and validates them. The [`AppConfig`] type
//! is the central configuration structure. The daemon base URL is the only
//! setting that can also be supplied through the environment, see
//! [`AppConfig::with_env_overrides`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variable that overrides `daemon.base_url`.
pub const DAEMON_URL_ENV: &str = "IPFSBRIDGE_DAEMON_URL";

/// Path prefix of every daemon API endpoint.
pub const API_PREFIX: &str = "/api/v0/";

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// IPFS daemon connection settings.
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// Pubsub streaming settings.
    #[serde(default)]
    pub pubsub: PubsubConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection settings for the IPFS daemon HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Base URL of the daemon, without the `/api/v0` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Deadline in seconds for request/response calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl DaemonConfig {
    /// Full URL of an API endpoint, e.g. `api_url("dag/get")`.
    pub fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}{}{}",
            self.base_url.trim_end_matches('/'),
            API_PREFIX,
            endpoint.trim_start_matches('/')
        )
    }
}

fn default_base_url() -> String {
    "http://localhost:9301".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Settings for long-lived pubsub subscriptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubsubConfig {
    /// Maximum silence in seconds between two chunks of a subscription
    /// stream (0 = wait indefinitely).
    #[serde(default)]
    pub idle_timeout_secs: u64,

    /// Largest single wire message, in bytes, a subscription will buffer.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

impl Default for PubsubConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 0,
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

fn default_max_message_bytes() -> usize {
    4 * 1024 * 1024
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    ///
    /// Meant to be called once by the application that owns the config; the
    /// client never reads the environment itself.
    pub fn with_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides using an arbitrary variable lookup.
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(DAEMON_URL_ENV).filter(|v| !v.trim().is_empty()) {
            debug!(base_url = %url, "daemon URL overridden from environment");
            self.daemon.base_url = url.trim().to_string();
        }
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.daemon.base_url.as_str();
        if url.is_empty() {
            return Err(ConfigError::Validation(
                "daemon.base_url must not be empty".to_string(),
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "daemon.base_url must start with http:// or https://, got {url:?}"
            )));
        }
        if self.daemon.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "daemon.request_timeout_secs must be non-zero".to_string(),
            ));
        }

        if self.pubsub.max_message_bytes == 0 {
            return Err(ConfigError::Validation(
                "pubsub.max_message_bytes must be non-zero".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {:?}, got {:?}",
                valid_levels, self.logging.level
            )));
        }

        Ok(())
    }
}
