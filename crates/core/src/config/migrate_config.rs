use crate::config::{validate_log_level, ConfigError, ConfigSource};
use std::fmt;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const MIGRATIONS_DIR: &str = "MIGRATIONS_DIR";
pub const PROJECT_ROOT: &str = "PROJECT_ROOT";
pub const DATABASE_HOST_HINT: &str = "DATABASE_HOST_HINT";
pub const LOG_LEVEL: &str = "LOG_LEVEL";
pub const LOG_FORMAT: &str = "LOG_FORMAT";

/// Files read into the process environment before configuration is loaded,
/// in priority order. Variables already present are never overridden.
pub const ENV_FILES: [&str; 2] = [".env.local", ".env"];

const DEFAULT_MIGRATIONS_DIR: &str = "migrations";
const DEFAULT_HOST_HINT: &str = "neon.tech";
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Output format of the diagnostic log on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::invalid_value(LOG_FORMAT, value, "one of: text, json")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Configuration trait for environment-driven settings
pub trait EnvConfig: Sized {
    /// Load configuration from the process environment
    fn from_env() -> Result<Self, ConfigError>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;

    /// Get configuration source information for debugging
    fn config_sources(&self) -> &HashMap<String, ConfigSource>;
}

/// Per-invocation settings for the runner and the verifier
#[derive(Debug, Clone)]
pub struct MigrateConfig {
    pub database_url: Option<String>,
    pub migrations_dir: PathBuf,
    pub project_root: PathBuf,
    pub expected_host: String,
    pub log_level: String,
    pub log_format: LogFormat,
    sources: HashMap<String, ConfigSource>,
}

impl MigrateConfig {
    /// Create a configuration with defaults and no database
    pub fn new() -> Self {
        let mut sources = HashMap::new();
        sources.insert(
            "database_url".to_string(),
            ConfigSource::Default("unset".to_string()),
        );
        sources.insert(
            "migrations_dir".to_string(),
            ConfigSource::Default(DEFAULT_MIGRATIONS_DIR.to_string()),
        );
        sources.insert(
            "project_root".to_string(),
            ConfigSource::Default(".".to_string()),
        );
        sources.insert(
            "expected_host".to_string(),
            ConfigSource::Default(DEFAULT_HOST_HINT.to_string()),
        );
        sources.insert(
            "log_level".to_string(),
            ConfigSource::Default(DEFAULT_LOG_LEVEL.to_string()),
        );
        sources.insert(
            "log_format".to_string(),
            ConfigSource::Default(LogFormat::default().to_string()),
        );

        Self {
            database_url: None,
            migrations_dir: PathBuf::from(DEFAULT_MIGRATIONS_DIR),
            project_root: PathBuf::from("."),
            expected_host: DEFAULT_HOST_HINT.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::default(),
            sources,
        }
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// `from_env` delegates here with `std::env::var`; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        // Empty strings count as unset
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = read(DATABASE_URL) {
            config.database_url = Some(url);
            config.mark_env("database_url", DATABASE_URL);
        }

        if let Some(dir) = read(MIGRATIONS_DIR) {
            config.migrations_dir = PathBuf::from(dir);
            config.mark_env("migrations_dir", MIGRATIONS_DIR);
        }

        if let Some(root) = read(PROJECT_ROOT) {
            config.project_root = PathBuf::from(root);
            config.mark_env("project_root", PROJECT_ROOT);
        }

        if let Some(host) = read(DATABASE_HOST_HINT) {
            config.expected_host = host;
            config.mark_env("expected_host", DATABASE_HOST_HINT);
        }

        if let Some(level) = read(LOG_LEVEL) {
            config.log_level = level.to_lowercase();
            config.mark_env("log_level", LOG_LEVEL);
        }

        if let Some(format) = read(LOG_FORMAT) {
            config.log_format = LogFormat::parse(format.trim())?;
            config.mark_env("log_format", LOG_FORMAT);
        }

        config.validate()?;
        Ok(config)
    }

    /// Override the migrations directory (CLI flag)
    pub fn with_migrations_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.migrations_dir = dir.into();
        self.sources
            .insert("migrations_dir".to_string(), ConfigSource::Programmatic);
        self
    }

    /// Override the project root (CLI flag)
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self.sources
            .insert("project_root".to_string(), ConfigSource::Programmatic);
        self
    }

    /// Set the database URL programmatically
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.database_url = if url.trim().is_empty() { None } else { Some(url) };
        self.sources
            .insert("database_url".to_string(), ConfigSource::Programmatic);
        self
    }

    /// The database URL, or the configuration error the runner reports
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url.as_deref().ok_or_else(|| {
            ConfigError::missing_required(
                DATABASE_URL,
                "Please set DATABASE_URL in your .env.local file",
            )
        })
    }

    /// Migrations directory, resolved against the project root when relative
    pub fn migrations_root(&self) -> PathBuf {
        if self.migrations_dir.is_absolute() {
            self.migrations_dir.clone()
        } else {
            self.project_root.join(&self.migrations_dir)
        }
    }

    fn mark_env(&mut self, field: &str, var: &str) {
        self.sources
            .insert(field.to_string(), ConfigSource::EnvVar(var.to_string()));
    }
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvConfig for MigrateConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_log_level(&self.log_level)?;

        if self.expected_host.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "expected_host",
                self.expected_host.clone(),
                "a non-empty host fragment such as neon.tech",
            ));
        }

        Ok(())
    }

    fn config_sources(&self) -> &HashMap<String, ConfigSource> {
        &self.sources
    }
}

/// Load `.env.local` and `.env` from `dir` into the process environment.
///
/// Missing files are fine. Returns the files that were actually read.
pub fn load_env_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let mut loaded = Vec::new();

    for name in ENV_FILES {
        let path = dir.join(name);
        match dotenvy::from_path(&path) {
            Ok(()) => {
                tracing::debug!(file = %path.display(), "loaded environment file");
                loaded.push(path);
            }
            Err(e) if e.not_found() => {}
            Err(e) => {
                return Err(ConfigError::environment_error(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        }
    }

    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = MigrateConfig::from_lookup(|_| None).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.migrations_dir, PathBuf::from("migrations"));
        assert_eq!(config.expected_host, "neon.tech");
        assert!(matches!(
            config.config_sources()["database_url"],
            ConfigSource::Default(_)
        ));
    }

    #[test]
    fn test_empty_database_url_counts_as_unset() {
        let config = MigrateConfig::from_lookup(lookup_from(&[(DATABASE_URL, "  ")])).unwrap();
        assert!(config.database_url.is_none());

        let err = config.require_database_url().unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { ref field, .. } if field == DATABASE_URL));
    }

    #[test]
    fn test_values_are_read_from_lookup() {
        let config = MigrateConfig::from_lookup(lookup_from(&[
            (DATABASE_URL, "postgres://user:pw@ep-1.neon.tech/db"),
            (MIGRATIONS_DIR, "db/migrations"),
            (LOG_LEVEL, "DEBUG"),
        ]))
        .unwrap();

        assert_eq!(
            config.require_database_url().unwrap(),
            "postgres://user:pw@ep-1.neon.tech/db"
        );
        assert_eq!(config.migrations_dir, PathBuf::from("db/migrations"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.config_sources()["migrations_dir"],
            ConfigSource::EnvVar(MIGRATIONS_DIR.to_string())
        );
    }

    #[test]
    fn test_invalid_log_level_is_rejected() {
        let result = MigrateConfig::from_lookup(lookup_from(&[(LOG_LEVEL, "chatty")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_log_format_is_read_and_checked() {
        let config = MigrateConfig::from_lookup(lookup_from(&[(LOG_FORMAT, "JSON")])).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);

        let result = MigrateConfig::from_lookup(lookup_from(&[(LOG_FORMAT, "yaml")]));
        assert!(
            matches!(result, Err(ConfigError::InvalidValue { ref field, .. }) if field == LOG_FORMAT)
        );
    }

    #[test]
    fn test_migrations_root_joins_relative_dir() {
        let config = MigrateConfig::new().with_project_root("/srv/app");
        assert_eq!(config.migrations_root(), PathBuf::from("/srv/app/migrations"));

        let config = config.with_migrations_dir("/opt/migrations");
        assert_eq!(config.migrations_root(), PathBuf::from("/opt/migrations"));
        assert_eq!(
            config.config_sources()["migrations_dir"],
            ConfigSource::Programmatic
        );
    }

    #[test]
    #[serial]
    fn test_env_local_is_loaded_without_overriding() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".env.local"),
            "PRESSROOM_TEST_FROM_FILE=local\nPRESSROOM_TEST_PRESET=file\n",
        )
        .unwrap();

        env::set_var("PRESSROOM_TEST_PRESET", "process");
        env::remove_var("PRESSROOM_TEST_FROM_FILE");

        let loaded = load_env_files(dir.path()).unwrap();
        assert_eq!(loaded, vec![dir.path().join(".env.local")]);
        assert_eq!(env::var("PRESSROOM_TEST_FROM_FILE").unwrap(), "local");
        assert_eq!(env::var("PRESSROOM_TEST_PRESET").unwrap(), "process");

        env::remove_var("PRESSROOM_TEST_FROM_FILE");
        env::remove_var("PRESSROOM_TEST_PRESET");
    }

    #[test]
    #[serial]
    fn test_missing_env_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        assert!(load_env_files(dir.path()).unwrap().is_empty());
    }
}
