//! Migration System
//!
//! Directory-per-migration layout: `<root>/<name>/up.sql`, `down.sql` and an
//! optional `migration.toml`. One named script runs per invocation.

pub mod definitions;
pub mod inspect;
pub mod manager;
pub mod runner;

pub use definitions::*;
pub use manager::MigrationManager;
pub use runner::MigrationRunner;
