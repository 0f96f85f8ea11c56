use anyhow::{bail, Context, Result};
use rusqlite::OptionalExtension;

use crate::db::{
    connection::Database,
    helpers::{quote_ident, sanitize_run_name},
    models::RunSummary,
    schema::{resolve_run_table, run_table_exists},
};

impl Database {
    /// All run tables, sorted by name, with their row counts and time range.
    pub async fn list_runs(&self) -> Result<Vec<RunSummary>> {
        self.execute(|conn| {
            let names = {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master
                     WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                     ORDER BY name ASC",
                )?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                names
            };

            let mut runs = Vec::with_capacity(names.len());
            for name in names {
                let table = quote_ident(&name);
                let rows: i64 = conn
                    .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                    .with_context(|| format!("failed to count rows of {name}"))?;
                let first_time: Option<String> = conn
                    .query_row(
                        &format!("SELECT time FROM {table} ORDER BY rowid ASC LIMIT 1"),
                        [],
                        |row| row.get(0),
                    )
                    .optional()?;
                let last_time: Option<String> = conn
                    .query_row(
                        &format!("SELECT time FROM {table} ORDER BY rowid DESC LIMIT 1"),
                        [],
                        |row| row.get(0),
                    )
                    .optional()?;

                runs.push(RunSummary {
                    name,
                    rows: rows.max(0) as u64,
                    first_time,
                    last_time,
                });
            }

            Ok(runs)
        })
        .await
    }

    pub async fn run_exists(&self, name: &str) -> Result<bool> {
        let name = name.to_string();
        self.execute(move |conn| run_table_exists(conn, &name)).await
    }

    /// The stored spelling of a run name, matched without regard to case.
    pub async fn resolve_run(&self, name: &str) -> Result<Option<String>> {
        let name = name.to_string();
        self.execute(move |conn| resolve_run_table(conn, &name)).await
    }

    /// Drop the named runs in one transaction and return how many existed.
    pub async fn drop_runs(&self, names: Vec<String>) -> Result<usize> {
        self.execute(move |conn| {
            for name in &names {
                if sanitize_run_name(name).ok().as_deref() != Some(name.as_str()) {
                    bail!("{name:?} is not a valid run name");
                }
            }

            let tx = conn.transaction().context("failed to open drop transaction")?;
            let mut dropped = 0;
            for name in &names {
                if let Some(stored) = resolve_run_table(&tx, name)? {
                    tx.execute_batch(&format!("DROP TABLE IF EXISTS {};", quote_ident(&stored)))
                        .with_context(|| format!("failed to drop run {stored}"))?;
                    dropped += 1;
                }
            }
            tx.commit().context("failed to commit dropped runs")?;

            Ok(dropped)
        })
        .await
    }
}
