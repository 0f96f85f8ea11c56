use chrono::{DateTime, Local};
use serde::Serialize;

/// One timestamped reactor/vapor reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub timestamp: DateTime<Local>,
    pub reactor: f64,
    pub vapor: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Local>, reactor: f64, vapor: f64) -> Self {
        Self {
            timestamp,
            reactor,
            vapor,
        }
    }
}
