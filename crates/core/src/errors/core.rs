use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Core error type shared by the migration runner and the verifier
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    Usage { message: String },

    #[error("Direction must be either \"up\" or \"down\" (got \"{value}\")")]
    InvalidDirection { value: String },

    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("Migration file not found: {}", path.display())]
    MigrationNotFound { path: PathBuf },

    #[error("Migration failed: {message}")]
    Database { message: String },

    #[error("Manifest error: {message}")]
    Manifest { message: String },
}

impl CoreError {
    /// Create a new usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create a new invalid direction error
    pub fn invalid_direction(value: impl Into<String>) -> Self {
        Self::InvalidDirection {
            value: value.into(),
        }
    }

    /// Create a new migration-not-found error for the resolved path
    pub fn migration_not_found(path: impl Into<PathBuf>) -> Self {
        Self::MigrationNotFound { path: path.into() }
    }

    /// Create a new database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Create a new manifest error
    pub fn manifest(message: impl Into<String>) -> Self {
        Self::Manifest {
            message: message.into(),
        }
    }

    /// Check if the error was raised before any I/O happened
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage { .. } | Self::InvalidDirection { .. })
    }

    /// Check if the error is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if the error is a missing migration file
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MigrationNotFound { .. })
    }
}

/// Result alias used across the workspace
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_direction_message_names_value() {
        let err = CoreError::invalid_direction("sideways");
        let message = err.to_string();
        assert!(message.starts_with("Direction must be either \"up\" or \"down\""));
        assert!(message.contains("sideways"));
        assert!(err.is_usage());
    }

    #[test]
    fn test_not_found_message_includes_path() {
        let err = CoreError::migration_not_found("migrations/missing/up.sql");
        assert_eq!(
            err.to_string(),
            "Migration file not found: migrations/missing/up.sql"
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn test_configuration_errors_are_transparent() {
        let err: CoreError = ConfigError::missing_required("DATABASE_URL", "Set it").into();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("DATABASE_URL"));
    }
}
