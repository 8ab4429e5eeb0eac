//! Configuration management for Courier.
//!
//! Handles loading polling tunables from TOML files, with serde-backed
//! defaults so an absent or sparse file still yields a working setup.

use crate::error::{CourierError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for Courier.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Result-polling tunables.
    #[serde(default)]
    pub polling: PollingConfig,
}

/// Tunables for the result poller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollingConfig {
    /// Interval between polls for the fixed-interval variant, in milliseconds.
    #[serde(default = "default_fixed_interval_ms")]
    pub fixed_interval_ms: u64,

    /// Starting interval for the growing-backoff variant, in milliseconds.
    #[serde(default = "default_base_interval_ms")]
    pub base_interval_ms: u64,

    /// Amount added to the interval after every empty poll, in milliseconds.
    #[serde(default = "default_increment_ms")]
    pub increment_ms: u64,

    /// Ceiling for the growing interval, in milliseconds.
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,

    /// Consecutive fetch failures tolerated before a task gives up.
    #[serde(default = "default_max_poll_failures")]
    pub max_poll_failures: u32,

    /// Capacity of the per-task progress event channel.
    #[serde(default = "default_progress_capacity")]
    pub progress_capacity: usize,
}

fn default_fixed_interval_ms() -> u64 {
    500
}

fn default_base_interval_ms() -> u64 {
    200
}

fn default_increment_ms() -> u64 {
    200
}

fn default_max_interval_ms() -> u64 {
    3000
}

fn default_max_poll_failures() -> u32 {
    3
}

fn default_progress_capacity() -> usize {
    32
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            fixed_interval_ms: default_fixed_interval_ms(),
            base_interval_ms: default_base_interval_ms(),
            increment_ms: default_increment_ms(),
            max_interval_ms: default_max_interval_ms(),
            max_poll_failures: default_max_poll_failures(),
            progress_capacity: default_progress_capacity(),
        }
    }
}

impl PollingConfig {
    /// The fixed-interval variant's poll interval.
    pub fn fixed_interval(&self) -> Duration {
        Duration::from_millis(self.fixed_interval_ms)
    }

    /// The growing-backoff variant's starting interval.
    pub fn base_interval(&self) -> Duration {
        Duration::from_millis(self.base_interval_ms)
    }

    /// The growing-backoff variant's per-empty-poll increment.
    pub fn increment(&self) -> Duration {
        Duration::from_millis(self.increment_ms)
    }

    /// The growing-backoff variant's interval ceiling.
    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    /// Checks that the tunables are internally consistent.
    pub fn validate(&self) -> Result<()> {
        if self.max_interval_ms < self.base_interval_ms {
            return Err(CourierError::config(
                "polling.max_interval_ms must be >= polling.base_interval_ms",
            ));
        }
        if self.progress_capacity == 0 {
            return Err(CourierError::config(
                "polling.progress_capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("db-courier")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the default configuration.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CourierError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            CourierError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })?;
        config.polling.validate()?;
        Ok(config)
    }
}
