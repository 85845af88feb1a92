//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Recovery context window must be at least one character")]
    ZeroRecoveryWindow,

    #[error("Hint description limit must be at least one character")]
    ZeroHintDescriptionLimit,

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}
