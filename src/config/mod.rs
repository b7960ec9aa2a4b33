//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `TOPSIS_EVALUATOR` prefix and nested values use double underscores as separators.
//! Every field has a default, so an empty environment is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use topsis_evaluator::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Default output param: {}", config.topsis.default_output_param);
//! ```

mod error;
mod logging;
mod topsis;

pub use error::{ConfigError, ValidationError};
pub use logging::{init_tracing, LoggingConfig};
pub use topsis::TopsisConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Log filter and output format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Calculator and validator tunables
    #[serde(default)]
    pub topsis: TopsisConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TOPSIS_EVALUATOR` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `TOPSIS_EVALUATOR__LOGGING__JSON=true` -> `logging.json = true`
    /// - `TOPSIS_EVALUATOR__TOPSIS__SINGLE_ENTITY_BASELINE_RATIO=0.2`
    ///   -> `topsis.single_entity_baseline_ratio = 0.2`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TOPSIS_EVALUATOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        self.topsis.validate()?;
        Ok(())
    }
}
