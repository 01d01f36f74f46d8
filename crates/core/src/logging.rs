//! Logging bootstrap for the command-line tools.
//!
//! Diagnostics go to stderr through `tracing`; stdout is reserved for the
//! command output the runner and the verifier print.

use std::io;
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "warn")
    pub level: String,
    /// Enable JSON structured logging (vs plain text)
    pub json_format: bool,
    /// Environment filter (supports complex filters like "pressroom_orm=debug,sqlx=warn")
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    /// Logging at the given level for the pressroom crates, sqlx kept quiet
    pub fn for_level(level: impl Into<String>) -> Self {
        let level = level.into();
        let env_filter = format!(
            "pressroom_core={level},pressroom_orm={level},pressroom_cli={level},sqlx=warn"
        );
        Self {
            level,
            json_format: false,
            env_filter: Some(env_filter),
        }
    }

    /// Set environment filter
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Switch to JSON output
    pub fn json(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// The filter directive used when `RUST_LOG` is not set
    pub fn directive(&self) -> &str {
        self.env_filter.as_deref().unwrap_or(&self.level)
    }
}

/// Initialize logging. `RUST_LOG` takes precedence over the configured filter.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(config.directive()))?;

    let result = if config.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stderr).json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stderr).with_target(false))
            .try_init()
    };

    if result.is_ok() {
        tracing::debug!(
            target: "pressroom::logging",
            "Logging initialized (level: {}, format: {})",
            config.level,
            if config.json_format { "JSON" } else { "text" }
        );
    }

    Ok(())
}
