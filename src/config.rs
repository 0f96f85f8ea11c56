//! Fixed operating constants.
//!
//! These are not operator settings; see `settings.rs` for the persisted preferences.

use std::time::Duration;

/// Rows kept by a bounded table view unless a caller asks for another capacity.
pub const DEFAULT_TABLE_CAPACITY: usize = 200;

/// Samples kept in the recent plot window (30 minutes at one sample per 15 s).
pub const PLOT_WINDOW_SAMPLES: usize = 120;

/// Nominal device sampling period.
pub const SAMPLE_PERIOD_SECS: i64 = 15;

pub const REACTOR_ALERT_CELSIUS: f64 = 250.0;
pub const VAPOR_ALERT_CELSIUS: f64 = 30.0;

/// The link is closed when no valid sample arrives within this interval.
pub const LINK_TIMEOUT: Duration = Duration::from_secs(30);

/// File name of the run database inside the data directory.
pub const DATABASE_FILE_NAME: &str = "HEXAR_data.db";
