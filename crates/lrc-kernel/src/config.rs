//! Configuration for the local coordination kernel

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Kernel configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KernelConfig {
    pub logging: LoggingConfig,
    pub monikers: MonikerConfig,
    pub time: TimeConfig,
    /// Maximum messages dispatched per `run` loop wake-up before yielding.
    pub drain_batch: usize,
}

/// Logging collaborator settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit JSON formatted logs instead of the pretty console format
    pub json_logs: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// How identifiers are rendered in log lines. Never consulted by dispatch.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonikerConfig {
    /// Print raw handles instead of object-model names.
    pub print_handles: bool,
}

/// Time management settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimeConfig {
    /// Hold timestamped deliveries for a constrained federate until granted.
    pub tso_delivery: bool,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self { tso_delivery: true }
    }
}

impl KernelConfig {
    pub const DEFAULT_DRAIN_BATCH: usize = 64;

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LRC_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `LRC_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `LRC_PRINT_HANDLES`: Print handles instead of names (default: false)
    /// - `LRC_DRAIN_BATCH`: Messages per dispatch wake-up (default: 64)
    /// - `LRC_TSO_DELIVERY`: Hold timestamped deliveries when constrained (default: true)
    pub fn from_env() -> Self {
        Self {
            logging: LoggingConfig {
                log_level: env::var("LRC_LOG_LEVEL")
                    .or_else(|_| env::var("RUST_LOG"))
                    .unwrap_or_else(|_| "info".to_string()),
                json_logs: env::var("LRC_JSON_LOGS")
                    .map(|v| v.to_lowercase() == "true" || v == "1")
                    .unwrap_or(false),
            },
            monikers: MonikerConfig {
                print_handles: env::var("LRC_PRINT_HANDLES")
                    .map(|v| v.to_lowercase() == "true" || v == "1")
                    .unwrap_or(false),
            },
            time: TimeConfig {
                tso_delivery: env::var("LRC_TSO_DELIVERY")
                    .map(|v| v.to_lowercase() != "false" && v != "0")
                    .unwrap_or(true),
            },
            drain_batch: env::var("LRC_DRAIN_BATCH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(Self::DEFAULT_DRAIN_BATCH),
        }
    }

    /// Parse a JSON configuration document. Missing fields take their defaults.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.drain_batch == 0 {
            return Err(ConfigError::Invalid {
                field: "drain_batch",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            monikers: MonikerConfig::default(),
            time: TimeConfig::default(),
            drain_batch: Self::DEFAULT_DRAIN_BATCH,
        }
    }
}
