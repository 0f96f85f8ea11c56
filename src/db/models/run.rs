use serde::{Deserialize, Serialize};

/// Listing entry for one run table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub name: String,
    pub rows: u64,
    pub first_time: Option<String>,
    pub last_time: Option<String>,
}
