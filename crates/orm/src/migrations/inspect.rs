//! Schema inspection through `information_schema`

use sqlx::PgConnection;

use super::definitions::ColumnInfo;
use crate::error::OrmResult;

const COLUMNS_SQL: &str = "SELECT column_name::text AS column_name, \
            data_type::text AS data_type, \
            is_nullable::text AS is_nullable, \
            column_default::text AS column_default \
     FROM information_schema.columns \
     WHERE table_name = $1 \
     ORDER BY ordinal_position";

const TABLE_EXISTS_SQL: &str = "SELECT EXISTS ( \
         SELECT FROM information_schema.tables \
         WHERE table_name = $1 \
     )";

/// Trivial round-trip used as a connectivity check
pub async fn ping(conn: &mut PgConnection) -> OrmResult<()> {
    let value: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&mut *conn).await?;
    tracing::debug!(value, "database round-trip succeeded");
    Ok(())
}

/// Whether a table with this name exists in any visible schema
pub async fn table_exists(conn: &mut PgConnection, table: &str) -> OrmResult<bool> {
    let exists: bool = sqlx::query_scalar(TABLE_EXISTS_SQL)
        .bind(table)
        .fetch_one(&mut *conn)
        .await?;
    Ok(exists)
}

/// Columns of a table, in ordinal order. Empty when the table does not exist.
pub async fn table_columns(conn: &mut PgConnection, table: &str) -> OrmResult<Vec<ColumnInfo>> {
    let columns = sqlx::query_as::<_, ColumnInfo>(COLUMNS_SQL)
        .bind(table)
        .fetch_all(&mut *conn)
        .await?;
    Ok(columns)
}
