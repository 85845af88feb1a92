//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `TOOLWEAVE` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use toolweave::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Default tool mode: {}", config.tooling.default_mode);
//! ```

mod ai;
mod error;
mod logging;
mod tooling;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use tooling::ToolingConfig;

use serde::Deserialize;

const LIST_KEYS: [&str; 2] = ["tooling.utility_tasks", "tooling.title_keywords"];

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// configuration. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Model call limits
    #[serde(default)]
    pub ai: AiConfig,

    /// Tool orchestration
    #[serde(default)]
    pub tooling: ToolingConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TOOLWEAVE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Splits list values on commas
    ///
    /// # Environment Variable Format
    ///
    /// - `TOOLWEAVE__TOOLING__DEFAULT_MODE=gating` -> `tooling.default_mode = gating`
    /// - `TOOLWEAVE__TOOLING__UTILITY_TASKS=title,summary` -> two entries
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = LIST_KEYS.into_iter().fold(
            config::Environment::default()
                .prefix("TOOLWEAVE")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
            |env, key| env.with_list_parse_key(key),
        );

        let config = config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load and validate in one step
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.tooling.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
