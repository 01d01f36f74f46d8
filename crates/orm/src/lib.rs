//! # pressroom-orm
//!
//! Database layer for the pressroom migration tools: migration file
//! loading, single-batch execution, `information_schema` inspection and the
//! example `articles` queries.

pub mod articles;
pub mod error;
pub mod migrations;

pub use error::{OrmError, OrmResult};
pub use migrations::{
    ColumnInfo, MigrationDirection, MigrationManager, MigrationMetadata, MigrationRunner,
    MigrationScript,
};
