//! Configuration for the todo state layer.
//!
//! Provides defaults for every setting, overrides from `TODO_*` environment
//! variables or a TOML document, and validation with clear error messages.
//!
//! # Example
//!
//! ```
//! use todo::config::TodoConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TodoConfig::from_toml_str(
//!     r#"
//!     [view]
//!     page_size = 5
//!     "#,
//! )?;
//!
//! assert_eq!(config.view.page_size, 5);
//! assert_eq!(config.view.debounce_ms, 300);
//! # Ok(())
//! # }
//! ```

use composable_state_runtime::StoreConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable holds something that is not a number
    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnvVar {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
    },

    /// Failed to parse a configuration document
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

/// Data source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Simulated latency of every source call, in milliseconds
    pub latency_ms: u64,
}

impl SourceConfig {
    /// Get latency as Duration
    #[must_use]
    pub const fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { latency_ms: 200 }
    }
}

/// Derived-view configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Quiet period before a query is committed, in milliseconds
    pub debounce_ms: u64,
    /// Records per page
    pub page_size: usize,
}

impl ViewConfig {
    /// Validate view configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Validation("page_size must be > 0".to_string()));
        }
        Ok(())
    }

    /// Get debounce window as Duration
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            page_size: 10,
        }
    }
}

/// Store runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Capacity of the action broadcast channel
    pub broadcast_capacity: usize,
    /// How long shutdown waits for in-flight effects, in milliseconds
    pub shutdown_timeout_ms: u64,
}

impl StoreSettings {
    /// Validate store configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.broadcast_capacity == 0 {
            return Err(ConfigError::Validation(
                "broadcast_capacity must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Runtime configuration for a store
    #[must_use]
    pub const fn store_config(&self) -> StoreConfig {
        StoreConfig::new(
            self.broadcast_capacity,
            Duration::from_millis(self.shutdown_timeout_ms),
        )
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
            shutdown_timeout_ms: 30_000,
        }
    }
}

/// Todo application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoConfig {
    /// Data source configuration
    pub source: SourceConfig,
    /// Derived-view configuration
    pub view: ViewConfig,
    /// Store runtime configuration
    pub store: StoreSettings,
}

impl TodoConfig {
    /// Load configuration from `TODO_*` environment variables
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is not a number or the result is invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from variables resolved by `lookup`
    ///
    /// # Errors
    ///
    /// Returns error if a variable is not a number or the result is invalid
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = parse_var(&lookup, "TODO_LATENCY_MS")? {
            config.source.latency_ms = value;
        }
        if let Some(value) = parse_var(&lookup, "TODO_DEBOUNCE_MS")? {
            config.view.debounce_ms = value;
        }
        if let Some(value) = parse_var(&lookup, "TODO_PAGE_SIZE")? {
            config.view.page_size = value;
        }
        if let Some(value) = parse_var(&lookup, "TODO_BROADCAST_CAPACITY")? {
            config.store.broadcast_capacity = value;
        }
        if let Some(value) = parse_var(&lookup, "TODO_SHUTDOWN_TIMEOUT_MS")? {
            config.store.shutdown_timeout_ms = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML document
    ///
    /// Missing tables and keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the document does not parse or the result is invalid
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(document).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration sections
    ///
    /// # Errors
    ///
    /// Returns error if any section is invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.view.validate()?;
        self.store.validate()?;
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };

    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(ConfigError::InvalidEnvVar { var, value }),
    }
}
