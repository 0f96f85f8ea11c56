use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

use super::helpers::quote_ident;

/// Columns of every run table, in storage order.
pub const RUN_COLUMNS: &str = "id, time, reactor, vapor, comment";

pub fn create_run_table(conn: &Connection, table: &str) -> Result<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            time TEXT NOT NULL,
            reactor REAL NOT NULL,
            vapor REAL NOT NULL,
            comment TEXT
        );",
        quote_ident(table)
    ))
    .with_context(|| format!("failed to create run table {table}"))
}

/// Stored name of the run table matching `table`. SQLite identifiers are
/// case-insensitive, so `h1` resolves to an existing `H1`.
pub fn resolve_run_table(conn: &Connection, table: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name = ?1 COLLATE NOCASE
         LIMIT 1",
        [table],
        |row| row.get(0),
    )
    .optional()
    .with_context(|| format!("failed to look up table {table}"))
}

pub fn run_table_exists(conn: &Connection, table: &str) -> Result<bool> {
    Ok(resolve_run_table(conn, table)?.is_some())
}
