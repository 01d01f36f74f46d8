//! Migration Manager - File system operations for migrations
//!
//! Resolves `<root>/<name>/<direction>.sql`, loads script text and the
//! optional metadata file. Nothing here touches the database.

use std::fs;
use std::path::PathBuf;

use super::definitions::{MigrationDirection, MigrationMetadata, MigrationScript, METADATA_FILE};
use crate::error::{OrmError, OrmResult};

/// Migrations whose name contains this fragment inspect the `articles`
/// table after `up` when they carry no metadata file.
const LEGACY_ARTICLES_FRAGMENT: &str = "articles";

/// Migration manager for locating and loading migration files
#[derive(Debug, Clone)]
pub struct MigrationManager {
    root: PathBuf,
}

impl MigrationManager {
    /// Create a manager rooted at the migrations directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory of a named migration
    pub fn migration_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Resolved SQL file path for a migration and direction
    pub fn script_path(&self, name: &str, direction: MigrationDirection) -> PathBuf {
        self.migration_dir(name).join(direction.filename())
    }

    /// Load one direction of a migration as opaque text
    pub fn load_script(&self, name: &str, direction: MigrationDirection) -> OrmResult<MigrationScript> {
        let path = self.script_path(name, direction);
        tracing::debug!(migration = name, %direction, path = %path.display(), "resolving migration file");

        if !path.is_file() {
            return Err(OrmError::NotFound(path));
        }

        let sql = fs::read_to_string(&path).map_err(|source| OrmError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(MigrationScript {
            name: name.to_string(),
            direction,
            path,
            sql,
        })
    }

    /// Load `migration.toml` for a migration, if present
    pub fn load_metadata(&self, name: &str) -> OrmResult<Option<MigrationMetadata>> {
        let path = self.migration_dir(name).join(METADATA_FILE);
        if !path.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|source| OrmError::Io {
            path: path.clone(),
            source,
        })?;

        toml::from_str(&content)
            .map(Some)
            .map_err(|e| OrmError::Metadata {
                path,
                message: e.to_string(),
            })
    }

    /// Table to list after a successful `up`, if any.
    ///
    /// `inspect_table` from the metadata file wins. Without a metadata file,
    /// migrations named after `articles` inspect the `articles` table.
    pub fn inspection_target(name: &str, metadata: Option<&MigrationMetadata>) -> Option<String> {
        match metadata {
            Some(metadata) => metadata.inspect_table.clone(),
            None if name.contains(LEGACY_ARTICLES_FRAGMENT) => {
                Some(LEGACY_ARTICLES_FRAGMENT.to_string())
            }
            None => None,
        }
    }

    /// Names of all migration directories holding at least one SQL file, sorted
    pub fn list_migrations(&self) -> OrmResult<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.root).map_err(|source| OrmError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter(|entry| {
                let dir = entry.path();
                dir.join(MigrationDirection::Up.filename()).is_file()
                    || dir.join(MigrationDirection::Down.filename()).is_file()
            })
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect();

        names.sort();
        Ok(names)
    }
}
