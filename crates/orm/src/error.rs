//! Error types for migration and query operations

use pressroom_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// ORM result type alias
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for migration loading, execution and article queries
#[derive(Debug, Error)]
pub enum OrmError {
    /// Database connection or query error
    #[error("{0}")]
    Database(String),
    /// Direction argument was not `up` or `down`
    #[error("Direction must be either \"up\" or \"down\" (got \"{0}\")")]
    InvalidDirection(String),
    /// Migration SQL file does not exist
    #[error("Migration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Migration file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// `migration.toml` could not be parsed
    #[error("Invalid migration metadata in {}: {message}", path.display())]
    Metadata { path: PathBuf, message: String },
    /// Input rejected before any SQL was built
    #[error("Validation error: {0}")]
    Validation(String),
}

impl OrmError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

// Convert from sqlx errors
impl From<sqlx::Error> for OrmError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => OrmError::Database(db.message().to_string()),
            other => OrmError::Database(other.to_string()),
        }
    }
}

impl From<OrmError> for CoreError {
    fn from(err: OrmError) -> Self {
        match err {
            OrmError::InvalidDirection(value) => CoreError::invalid_direction(value),
            OrmError::NotFound(path) => CoreError::migration_not_found(path),
            OrmError::Io { source, .. } => CoreError::Io(source),
            OrmError::Metadata { .. } => CoreError::manifest(err.to_string()),
            OrmError::Database(message) => CoreError::database(message),
            OrmError::Validation(message) => CoreError::usage(message),
        }
    }
}
