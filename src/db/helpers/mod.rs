use anyhow::{Context, Result};
use chrono::NaiveTime;

use crate::errors::RunNameError;

/// Wall-clock format of the `time` column.
pub const CLOCK_FORMAT: &str = "%H:%M:%S";

/// Reduce an operator-typed run name to a usable table name.
///
/// Letters and digits of any script are kept along with `_`; everything else is dropped.
pub fn sanitize_run_name(raw: &str) -> Result<String, RunNameError> {
    let name: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();

    if name.is_empty() {
        return Err(RunNameError::Empty);
    }
    if name.to_ascii_lowercase().starts_with("sqlite_") {
        return Err(RunNameError::Reserved(name));
    }
    Ok(name)
}

/// Quote a sanitized table name for interpolation into SQL.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn parse_clock_time(value: &str, field: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), CLOCK_FORMAT)
        .with_context(|| format!("failed to parse {field} {value:?}"))
}

pub fn to_i64(value: usize) -> Result<i64> {
    i64::try_from(value).with_context(|| format!("value {value} exceeds SQLite INTEGER range"))
}
