use serde::{Deserialize, Serialize};

/// One persisted reading of a run table.
///
/// `row_id` is assigned by SQLite on insert and never changes; `comment` is the only
/// field an operator may edit afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRow {
    pub row_id: i64,
    pub time: String,
    pub reactor: f64,
    pub vapor: f64,
    pub comment: String,
}

/// A reading about to be appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLogRow {
    pub time: String,
    pub reactor: f64,
    pub vapor: f64,
    pub comment: String,
}

impl NewLogRow {
    pub fn reading(time: impl Into<String>, reactor: f64, vapor: f64) -> Self {
        Self {
            time: time.into(),
            reactor,
            vapor,
            comment: String::new(),
        }
    }
}
