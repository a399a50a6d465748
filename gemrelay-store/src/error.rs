//! Store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse or serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The configuration still holds no usable API key.
    #[error("Not configured yet: {0}")]
    NotConfigured(String),

    /// Temperature is negative or not a number.
    #[error("Invalid temperature: {0}")]
    InvalidTemperature(f64),

    /// A configuration file already exists where a default was requested.
    #[error("Configuration file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Any other invalid value.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Returns true if the user has not supplied API keys yet.
    pub fn is_not_configured(&self) -> bool {
        matches!(self, ConfigError::NotConfigured(_))
    }
}
