use pressroom_core::{CoreError, CoreResult, MigrateConfig};
use pressroom_orm::{MigrationDirection, MigrationManager, MigrationRunner, MigrationScript};
use std::path::Path;

use crate::utils::{mask_database_url, render_column_table};

pub const USAGE: &str = "Usage: run-migration <migration-name> <up|down>";
pub const EXAMPLE: &str = "Example: run-migration 001_create_articles_table up";

/// A migration that passed every precondition and is ready to execute
#[derive(Debug)]
pub struct PreparedMigration {
    pub script: MigrationScript,
    pub database_url: String,
    /// From `migration.toml`, printed under the header
    pub description: Option<String>,
    /// Table listed after a successful `up`
    pub inspect_table: Option<String>,
}

/// Parse the direction, then read the environment from `working_dir`.
///
/// A bad direction is reported before any env file or variable is read.
pub fn load(direction: &str, working_dir: &Path) -> CoreResult<(MigrationDirection, MigrateConfig)> {
    let direction: MigrationDirection = direction.parse()?;
    let config = crate::bootstrap_in(working_dir)?;
    Ok((direction, config))
}

/// Validate an invocation without touching the database.
///
/// `DATABASE_URL` is checked before the SQL file. The first failure is returned.
pub fn prepare(
    name: &str,
    direction: MigrationDirection,
    config: &MigrateConfig,
) -> CoreResult<PreparedMigration> {
    let database_url = config.require_database_url()?.to_string();

    let manager = MigrationManager::new(config.migrations_root());
    let script = manager.load_script(name, direction)?;
    let metadata = manager.load_metadata(name)?;

    let inspect_table = match direction {
        MigrationDirection::Up => MigrationManager::inspection_target(name, metadata.as_ref()),
        MigrationDirection::Down => None,
    };

    Ok(PreparedMigration {
        script,
        database_url,
        description: metadata.and_then(|m| m.description),
        inspect_table,
    })
}

/// Print the script, execute it, and list the inspected table on success
pub async fn run(prepared: PreparedMigration) -> CoreResult<()> {
    let PreparedMigration {
        script,
        database_url,
        description,
        inspect_table,
    } = prepared;

    println!("\n🚀 Running migration: {} ({})", script.name, script.direction);
    if let Some(description) = description {
        println!("📝 {}", description);
    }
    println!("📄 SQL file: {}", script.path.display());
    println!("🔌 Database: {}", mask_database_url(&database_url));
    println!("\n--- SQL Content ---");
    println!("{}", script.sql);
    println!("--- End SQL ---\n");

    let mut runner = MigrationRunner::connect(&database_url).await?;
    runner.execute(&script).await?;

    println!("✅ Migration {} completed successfully!", script.direction);

    if let Some(table) = inspect_table {
        let columns = runner.table_columns(&table).await?;
        println!("\n📋 {} table structure:", table);
        println!("{}", render_column_table(&columns));
    }

    if let Err(e) = runner.close().await {
        tracing::warn!("failed to close database connection cleanly: {}", e);
    }

    Ok(())
}

/// Extra lines printed under a failure, pointing at likely fixes.
///
/// `config` is `None` when the failure happened before it was loaded.
pub fn hints_for(error: &CoreError, config: Option<&MigrateConfig>) -> Vec<String> {
    match (error, config) {
        (CoreError::MigrationNotFound { .. }, Some(config)) => {
            let manager = MigrationManager::new(config.migrations_root());
            match manager.list_migrations() {
                Ok(names) if !names.is_empty() => {
                    let mut hints = vec!["Available migrations:".to_string()];
                    hints.extend(names.into_iter().map(|name| format!("  {}", name)));
                    hints
                }
                _ => vec![format!(
                    "No migrations found under {}",
                    config.migrations_root().display()
                )],
            }
        }
        (CoreError::InvalidDirection { .. }, _) => vec![USAGE.to_string(), EXAMPLE.to_string()],
        _ => Vec::new(),
    }
}
