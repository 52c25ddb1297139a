//! `parcel` table definition and readiness checks.
//!
//! # Invariants
//! - `PARCEL_COLUMNS` lists every column the store reads or writes.
//! - `ensure_schema` only uses `IF NOT EXISTS` statements.

use super::DbResult;
use rusqlite::Connection;

/// Table holding one row per parcel.
pub const PARCEL_TABLE: &str = "parcel";

/// Columns the store depends on, in `SELECT` order.
pub const PARCEL_COLUMNS: &[&str] = &["number", "client", "status", "address", "created_at"];

const PARCEL_SCHEMA_SQL: &str = include_str!("parcel.sql");

/// Creates the `parcel` table and its client index when missing.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(PARCEL_SCHEMA_SQL)?;
    Ok(())
}

/// Returns whether `table` exists in the connected database.
pub fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Returns the column names of `table` in declaration order.
pub fn table_columns(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}
