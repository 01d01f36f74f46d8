//! Shared plumbing for the `run-migration` and `verify` binaries.

pub mod commands;
pub mod utils;

use pressroom_core::{
    init_logging, load_env_files, CoreResult, EnvConfig, LogFormat, LoggingConfig, MigrateConfig,
};
use std::path::Path;

/// Load `.env.local`/`.env` from the working directory, read the
/// configuration and install logging. Runs once at process start.
pub fn bootstrap() -> CoreResult<MigrateConfig> {
    let cwd = std::env::current_dir()?;
    bootstrap_in(&cwd)
}

/// [`bootstrap`] with env files read from `dir`
pub fn bootstrap_in(dir: &Path) -> CoreResult<MigrateConfig> {
    let loaded = load_env_files(dir)?;
    let config = MigrateConfig::from_env()?;

    if let Err(e) = init_logging(&logging_config(&config)) {
        eprintln!("⚠️  Failed to initialize logging: {}", e);
    }

    for file in &loaded {
        tracing::debug!(file = %file.display(), "environment file applied");
    }
    for (field, source) in config.config_sources() {
        tracing::debug!(field = %field, source = %source, "configuration value");
    }

    Ok(config)
}

/// Logging settings derived from `LOG_LEVEL` and `LOG_FORMAT`
pub fn logging_config(config: &MigrateConfig) -> LoggingConfig {
    let logging = LoggingConfig::for_level(config.log_level.as_str());
    match config.log_format {
        LogFormat::Json => logging.json(),
        LogFormat::Text => logging,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_follows_configured_format() {
        let mut config = MigrateConfig::new();
        assert!(!logging_config(&config).json_format);

        config.log_format = LogFormat::Json;
        config.log_level = "debug".to_string();
        let logging = logging_config(&config);
        assert!(logging.json_format);
        assert_eq!(logging.level, "debug");
    }
}
