// src/config/loader.rs
//! Configuration loading with fail-fast validation

use crate::config::SystemConfig;
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// The file exists but is not valid TOML for the expected schema
    #[error("configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Reading the file failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The predictor base URL is absent; the session must not initialize
    #[error("predictor base_url is required")]
    MissingBaseUrl,

    /// The configured exercise has no built-in or override definition
    #[error("unknown exercise: {0}")]
    UnknownExercise(String),

    /// One or more consistency checks failed
    #[error("configuration validation failed: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl SystemConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// Validation runs before the config is returned, so a session can never
    /// be constructed from a half-usable file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: SystemConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}
