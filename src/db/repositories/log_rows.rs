use anyhow::{bail, Context, Result};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{quote_ident, to_i64},
    models::{LogRow, NewLogRow},
    schema::{create_run_table, RUN_COLUMNS},
};

fn row_to_log_row(row: &Row) -> Result<LogRow, rusqlite::Error> {
    let comment: Option<String> = row.get("comment")?;

    Ok(LogRow {
        row_id: row.get("id")?,
        time: row.get("time")?,
        reactor: row.get("reactor")?,
        vapor: row.get("vapor")?,
        comment: comment.unwrap_or_default(),
    })
}

impl Database {
    pub async fn create_run_table(&self, table: &str) -> Result<()> {
        let table = table.to_string();
        self.execute(move |conn| create_run_table(conn, &table)).await
    }

    /// Append one reading and return its row id.
    pub async fn insert_log_row(&self, table: &str, row: &NewLogRow) -> Result<i64> {
        let table = table.to_string();
        let record = row.clone();
        self.execute(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO {} (time, reactor, vapor, comment) VALUES (?1, ?2, ?3, ?4)",
                    quote_ident(&table)
                ),
                params![record.time, record.reactor, record.vapor, record.comment],
            )
            .with_context(|| format!("failed to insert reading into {table}"))?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    /// Append many readings in one transaction; either all rows land or none do.
    pub async fn insert_log_rows(&self, table: &str, rows: Vec<NewLogRow>) -> Result<usize> {
        let table = table.to_string();
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open insert transaction")?;
            {
                let mut stmt = tx.prepare(&format!(
                    "INSERT INTO {} (time, reactor, vapor, comment) VALUES (?1, ?2, ?3, ?4)",
                    quote_ident(&table)
                ))?;
                for record in &rows {
                    stmt.execute(params![record.time, record.reactor, record.vapor, record.comment])
                        .with_context(|| format!("failed to insert reading into {table}"))?;
                }
            }
            tx.commit().context("failed to commit readings")?;
            Ok(rows.len())
        })
        .await
    }

    /// The newest `limit` rows of a run, oldest first.
    pub async fn fetch_recent_rows(&self, table: &str, limit: usize) -> Result<Vec<LogRow>> {
        let table = table.to_string();
        self.execute(move |conn| {
            let limit = to_i64(limit)?;
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT rowid AS id, time, reactor, vapor, comment
                     FROM {}
                     ORDER BY rowid DESC
                     LIMIT ?1",
                    quote_ident(&table)
                ))
                .with_context(|| format!("failed to query recent rows of {table}"))?;

            let mut rows = stmt
                .query_map(params![limit], row_to_log_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.reverse();

            Ok(rows)
        })
        .await
    }

    pub async fn fetch_all_rows(&self, table: &str) -> Result<Vec<LogRow>> {
        let table = table.to_string();
        self.execute(move |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {RUN_COLUMNS} FROM {} ORDER BY id ASC",
                    quote_ident(&table)
                ))
                .with_context(|| format!("failed to query rows of {table}"))?;

            let rows = stmt
                .query_map([], row_to_log_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
        .await
    }

    /// Replace the comment of the row identified by `row_id`.
    pub async fn update_comment(&self, table: &str, row_id: i64, comment: &str) -> Result<()> {
        let table = table.to_string();
        let comment = comment.to_string();
        self.execute(move |conn| {
            let rows_affected = conn
                .execute(
                    &format!("UPDATE {} SET comment = ?1 WHERE rowid = ?2", quote_ident(&table)),
                    params![comment, row_id],
                )
                .with_context(|| format!("failed to update comment in {table}"))?;

            if rows_affected == 0 {
                bail!("row {row_id} not found in {table}");
            }
            Ok(())
        })
        .await
    }
}
