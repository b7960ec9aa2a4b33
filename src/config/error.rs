//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Tracing initialisation failed: {0}")]
    Tracing(String),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid log filter directive: {0}")]
    InvalidLogFilter(String),

    #[error("Single-entity baseline ratio must be in (0, 1), got {0}")]
    InvalidBaselineRatio(f64),

    #[error("{name} must be a positive finite number, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("Minimum valid entity ratio must be in [0, 1], got {0}")]
    InvalidValidEntityRatio(f64),
}
