//! Migration Runner - Executes a migration script against the database
//!
//! One connection per invocation. The script text is submitted as a single
//! batch over the simple-query protocol: no splitting, no implicit
//! transaction. Scripts that need atomicity wrap themselves in BEGIN/COMMIT.

use sqlx::{Connection, Executor, PgConnection};

use super::definitions::{ColumnInfo, MigrationScript};
use crate::error::{OrmError, OrmResult};

/// Migration runner holding a single database connection
pub struct MigrationRunner {
    conn: PgConnection,
}

impl MigrationRunner {
    /// Wrap an existing connection
    pub fn new(conn: PgConnection) -> Self {
        Self { conn }
    }

    /// Open a connection from a database URL
    pub async fn connect(database_url: &str) -> OrmResult<Self> {
        tracing::debug!("opening database connection");
        let conn = PgConnection::connect(database_url)
            .await
            .map_err(|e| OrmError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(Self::new(conn))
    }

    /// Get the underlying connection
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }

    /// Submit the script's full text as one batch
    pub async fn execute(&mut self, script: &MigrationScript) -> OrmResult<u64> {
        tracing::info!(
            migration = %script.name,
            direction = %script.direction,
            bytes = script.sql.len(),
            "executing migration batch"
        );

        let result = self.conn.execute(script.sql.as_str()).await?;
        Ok(result.rows_affected())
    }

    /// Columns of a table, in ordinal order
    pub async fn table_columns(&mut self, table: &str) -> OrmResult<Vec<ColumnInfo>> {
        super::inspect::table_columns(&mut self.conn, table).await
    }

    /// Close the connection gracefully
    pub async fn close(self) -> OrmResult<()> {
        self.conn.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::{inspect, MigrationDirection, MigrationManager};
    use std::path::Path;

    const ARTICLES_MIGRATION: &str = "001_create_articles_table";

    fn database_url() -> Option<String> {
        std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
    }

    #[tokio::test]
    #[ignore] // Needs DATABASE_URL pointing at a disposable database
    async fn test_up_then_down_restores_schema() {
        let Some(url) = database_url() else { return };
        let manager =
            MigrationManager::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations"));
        let up = manager.load_script(ARTICLES_MIGRATION, MigrationDirection::Up).unwrap();
        let down = manager.load_script(ARTICLES_MIGRATION, MigrationDirection::Down).unwrap();

        let mut runner = MigrationRunner::connect(&url).await.unwrap();
        if inspect::table_exists(runner.connection(), "articles").await.unwrap() {
            // Never drop a table this test did not create
            return;
        }

        runner.execute(&up).await.unwrap();
        assert!(inspect::table_exists(runner.connection(), "articles").await.unwrap());
        inspect::ping(runner.connection()).await.unwrap();

        let columns = runner.table_columns("articles").await.unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.column_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["id", "title", "author", "primary_image", "content", "created_time"]
        );
        assert_eq!(columns[0].data_type, "integer");
        assert_eq!(columns[0].is_nullable, "NO");
        assert!(columns[0]
            .column_default
            .as_deref()
            .is_some_and(|default| default.starts_with("nextval(")));
        assert_eq!(columns[3].is_nullable, "YES");

        runner.execute(&down).await.unwrap();
        assert!(!inspect::table_exists(runner.connection(), "articles").await.unwrap());
        assert!(runner.table_columns("articles").await.unwrap().is_empty());

        runner.close().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Needs DATABASE_URL pointing at a disposable database
    async fn test_failing_batch_reports_server_message() {
        let Some(url) = database_url() else { return };
        let script = crate::migrations::MigrationScript {
            name: "broken".to_string(),
            direction: MigrationDirection::Up,
            path: Path::new("broken/up.sql").to_path_buf(),
            sql: "SELECT * FROM pressroom_table_that_does_not_exist;".to_string(),
        };

        let mut runner = MigrationRunner::connect(&url).await.unwrap();
        match runner.execute(&script).await {
            Err(OrmError::Database(message)) => {
                assert!(message.contains("pressroom_table_that_does_not_exist"))
            }
            other => panic!("expected a database error, got {:?}", other),
        }
        runner.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_failure_is_a_database_error() {
        match MigrationRunner::connect("postgres://user:pw@127.0.0.1:1/db").await {
            Err(OrmError::Database(message)) => {
                assert!(message.starts_with("Failed to connect to database"))
            }
            Err(other) => panic!("expected a database error, got {:?}", other),
            Ok(_) => panic!("connected to a closed port"),
        }
    }
}
