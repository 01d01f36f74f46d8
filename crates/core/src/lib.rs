pub mod config;
pub mod errors;
pub mod logging;

pub use config::{
    load_env_files, ConfigError, ConfigSource, EnvConfig, LogFormat, MigrateConfig, DATABASE_URL,
};
pub use errors::{CoreError, CoreResult};
pub use logging::{init_logging, LoggingConfig};
