//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies to this
//! crate and everything else is limited to warnings.
//!
//! # Example
//!
//! ```no_run
//! use toolweave::config::AppConfig;
//! use toolweave::telemetry;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! telemetry::init_tracing(&config.logging);
//! tracing::info!(mode = %config.tooling.default_mode, "tool orchestration ready");
//! ```

use std::sync::Once;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Directives applied when `RUST_LOG` is absent.
pub fn default_directives(config: &LoggingConfig) -> String {
    format!("warn,toolweave={}", config.level)
}

/// Builds the filter used when `RUST_LOG` is absent.
pub fn default_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::new(default_directives(config))
}

/// Installs the global subscriber. Later calls are ignored, as is an already
/// installed subscriber (for example one set up by a test harness).
pub fn init_tracing(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config));
        let registry = tracing_subscriber::registry().with(filter);

        let result = if config.json {
            registry
                .with(fmt::layer().json().with_target(true).with_current_span(true))
                .try_init()
        } else {
            registry.with(fmt::layer().with_target(true)).try_init()
        };

        if let Err(e) = result {
            eprintln!("tracing subscriber already installed: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_scopes_level_to_crate() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            json: false,
        };
        assert_eq!(default_directives(&config), "warn,toolweave=debug");

        // EnvFilter reorders directives when displayed.
        let rendered = default_filter(&config).to_string();
        let mut directives: Vec<&str> = rendered.split(',').collect();
        directives.sort_unstable();
        assert_eq!(directives, vec!["toolweave=debug", "warn"]);
    }

    #[test]
    fn init_is_idempotent() {
        let config = LoggingConfig::default();
        init_tracing(&config);
        init_tracing(&config);
    }
}
