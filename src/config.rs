//! Configuration management for Lifescope
//!
//! This module handles loading, validation, and management of the runtime
//! configuration from YAML files. The config path can be overridden with the
//! `LIFESCOPE_CONFIG` environment variable.

use crate::error::{LifescopeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

mod defaults;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "LIFESCOPE_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Background I/O dispatcher configuration
    pub dispatcher: DispatcherConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional console-specific level; falls back to `level`
    pub console_level: Option<String>,

    /// Optional file-specific level; falls back to `level`
    pub file_level: Option<String>,

    /// Path to log file (or directory for rotated files)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to the console (stderr)
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// Sizing of the dedicated background runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Async worker threads
    pub worker_threads: usize,

    /// Upper bound on threads used for blocking I/O work
    pub max_blocking_threads: usize,

    /// Name prefix for runtime threads
    pub thread_name: String,

    /// Idle blocking threads are reclaimed after this many milliseconds
    pub thread_keep_alive_ms: u64,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the environment override or default locations
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
            && !path.is_empty()
        {
            return Self::from_file(path);
        }

        let default_paths = ["lifescope.yaml", "/etc/lifescope/config.yaml"];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        crate::logging::parse_log_level(&self.logging.level)
            .map_err(|_| LifescopeError::validation("logging.level", "Unknown log level"))?;

        for (field, level) in [
            ("logging.console_level", &self.logging.console_level),
            ("logging.file_level", &self.logging.file_level),
        ] {
            if let Some(level) = level
                && crate::logging::parse_log_level(level).is_err()
            {
                return Err(LifescopeError::validation(field, "Unknown log level"));
            }
        }

        if self.logging.file.is_empty() {
            return Err(LifescopeError::validation(
                "logging.file",
                "Log file path cannot be empty",
            ));
        }

        if self.dispatcher.worker_threads == 0 {
            return Err(LifescopeError::validation(
                "dispatcher.worker_threads",
                "Must be greater than 0",
            ));
        }

        if self.dispatcher.max_blocking_threads == 0 {
            return Err(LifescopeError::validation(
                "dispatcher.max_blocking_threads",
                "Must be greater than 0",
            ));
        }

        if self.dispatcher.thread_name.trim().is_empty() {
            return Err(LifescopeError::validation(
                "dispatcher.thread_name",
                "Thread name cannot be empty",
            ));
        }

        Ok(())
    }
}
