//! Migration Definitions - Core types for the directory-per-migration layout
//!
//! A migration is a directory under the migrations root holding `up.sql`,
//! `down.sql` and an optional `migration.toml`.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::OrmError;

/// File name of the optional per-migration metadata
pub const METADATA_FILE: &str = "migration.toml";

/// Migration direction for execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationDirection {
    /// Apply the migration (run up.sql)
    Up,
    /// Rollback the migration (run down.sql)
    Down,
}

impl MigrationDirection {
    /// SQL file holding this direction's statements
    pub fn filename(&self) -> &'static str {
        match self {
            Self::Up => "up.sql",
            Self::Down => "down.sql",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl FromStr for MigrationDirection {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(OrmError::InvalidDirection(other.to_string())),
        }
    }
}

impl fmt::Display for MigrationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One direction of a migration, loaded from disk
#[derive(Debug, Clone)]
pub struct MigrationScript {
    /// Migration directory name, e.g. `001_create_articles_table`
    pub name: String,
    pub direction: MigrationDirection,
    /// Resolved path of the SQL file
    pub path: PathBuf,
    /// File content, passed to the database verbatim
    pub sql: String,
}

/// Contents of `migration.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationMetadata {
    /// Free-form description, printed under the runner's header
    pub description: Option<String>,
    /// Table whose columns are listed after a successful `up`
    pub inspect_table: Option<String>,
}

/// One row of `information_schema.columns`
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: String,
    pub column_default: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parsing_is_exact() {
        assert_eq!("up".parse::<MigrationDirection>().unwrap(), MigrationDirection::Up);
        assert_eq!("down".parse::<MigrationDirection>().unwrap(), MigrationDirection::Down);

        for bad in ["UP", "Down", "sideways", "", " up"] {
            match bad.parse::<MigrationDirection>() {
                Err(OrmError::InvalidDirection(value)) => assert_eq!(value, bad),
                other => panic!("expected InvalidDirection for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_direction_filenames() {
        assert_eq!(MigrationDirection::Up.filename(), "up.sql");
        assert_eq!(MigrationDirection::Down.filename(), "down.sql");
        assert_eq!(MigrationDirection::Down.to_string(), "down");
    }

    #[test]
    fn test_metadata_parses_from_toml() {
        let metadata: MigrationMetadata = toml::from_str(
            "description = \"Create the articles table\"\ninspect_table = \"articles\"\n",
        )
        .unwrap();
        assert_eq!(metadata.inspect_table.as_deref(), Some("articles"));

        let empty: MigrationMetadata = toml::from_str("").unwrap();
        assert_eq!(empty, MigrationMetadata::default());

        assert!(toml::from_str::<MigrationMetadata>("inspect = \"articles\"").is_err());
    }
}
