//! Configuration module for Snail Mail.

use serde::Deserialize;
use std::path::Path;

use crate::auth::CredentialStorage;
use crate::{Result, SnailmailError};

/// Datastore configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatastoreConfig {
    /// How user credentials are stored (plaintext / argon2).
    #[serde(default)]
    pub credential_storage: CredentialStorage,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/snailmail.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Datastore configuration.
    #[serde(default)]
    pub datastore: DatastoreConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(SnailmailError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file, apply environment variable
    /// overrides and validate the result.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| SnailmailError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `SNAILMAIL_LOG_LEVEL`: Override the log level
    /// - `SNAILMAIL_CREDENTIAL_STORAGE`: Override the credential storage (plaintext / argon2)
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(level) = std::env::var("SNAILMAIL_LOG_LEVEL") {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }

        if let Ok(storage) = std::env::var("SNAILMAIL_CREDENTIAL_STORAGE") {
            if !storage.is_empty() {
                self.datastore.credential_storage =
                    storage.parse().map_err(SnailmailError::Config)?;
            }
        }

        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Returns an error if the log level or the log file path is empty.
    pub fn validate(&self) -> Result<()> {
        if self.logging.level.trim().is_empty() {
            return Err(SnailmailError::Config("logging.level is empty".to_string()));
        }
        if self.logging.file.trim().is_empty() {
            return Err(SnailmailError::Config("logging.file is empty".to_string()));
        }
        Ok(())
    }
}
