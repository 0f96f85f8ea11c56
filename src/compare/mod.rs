//! Side-by-side view of finished runs.
//!
//! Each run is rebased to minutes since its first reading so runs started at different
//! times of day line up. An optional filter smooths out-of-band sensor glitches.

pub mod filter;

use anyhow::Result;
use chrono::Timelike;
use log::{info, warn};
use serde::Serialize;

use crate::db::{helpers::parse_clock_time, Database, LogRow};

use filter::{filter_outliers, OUTLIER_MAX, OUTLIER_MIN, OUTLIER_WINDOW};

const PALETTE: [&str; 8] = [
    "blue", "green", "red", "orange", "purple", "brown", "cyan", "magenta",
];

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub minutes: f64,
    pub reactor: f64,
    pub vapor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentMarker {
    pub minutes: f64,
    pub reactor: f64,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSeries {
    pub name: String,
    pub color: String,
    pub points: Vec<SeriesPoint>,
    pub comments: Vec<CommentMarker>,
    /// Rows skipped because their time did not parse.
    pub dropped_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFailure {
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunComparison {
    pub filtered: bool,
    pub runs: Vec<RunSeries>,
    pub failed: Vec<RunFailure>,
}

/// Rebase one run's rows onto a minutes-since-start axis.
///
/// A time earlier than its predecessor is taken as a midnight rollover.
pub fn build_series(name: &str, color: &str, rows: &[LogRow], filter: bool) -> RunSeries {
    let mut dropped_rows = 0;
    let mut kept: Vec<(f64, &LogRow)> = Vec::with_capacity(rows.len());
    let mut start: Option<i64> = None;
    let mut previous = 0i64;
    let mut day_offset = 0i64;

    for row in rows {
        let Ok(time) = parse_clock_time(&row.time, "time") else {
            dropped_rows += 1;
            continue;
        };
        let seconds = i64::from(time.num_seconds_from_midnight());
        if start.is_some() && seconds < previous {
            day_offset += SECONDS_PER_DAY;
        }
        previous = seconds;
        let absolute = seconds + day_offset;
        let origin = *start.get_or_insert(absolute);
        kept.push(((absolute - origin) as f64 / 60.0, row));
    }

    let reactor: Vec<f64> = kept.iter().map(|(_, row)| row.reactor).collect();
    let vapor: Vec<f64> = kept.iter().map(|(_, row)| row.vapor).collect();
    let (reactor_plot, vapor_plot) = if filter {
        (
            filter_outliers(&reactor, OUTLIER_WINDOW, OUTLIER_MIN, OUTLIER_MAX),
            filter_outliers(&vapor, OUTLIER_WINDOW, OUTLIER_MIN, OUTLIER_MAX),
        )
    } else {
        (reactor.clone(), vapor.clone())
    };

    let points = kept
        .iter()
        .enumerate()
        .map(|(i, (minutes, _))| SeriesPoint {
            minutes: *minutes,
            reactor: reactor_plot[i],
            vapor: vapor_plot[i],
        })
        .collect();

    let comments = kept
        .iter()
        .filter(|(_, row)| !row.comment.trim().is_empty())
        .map(|(minutes, row)| CommentMarker {
            minutes: *minutes,
            reactor: row.reactor,
            comment: row.comment.clone(),
        })
        .collect();

    RunSeries {
        name: name.to_string(),
        color: color.to_string(),
        points,
        comments,
        dropped_rows,
    }
}

/// Load and rebase the named runs. A run that fails to load is reported, not fatal.
pub async fn compare_runs(db: &Database, names: &[String], filter: bool) -> Result<RunComparison> {
    let mut runs = Vec::with_capacity(names.len());
    let mut failed = Vec::new();

    for (index, name) in names.iter().enumerate() {
        match db.fetch_all_rows(name).await {
            Ok(rows) if rows.is_empty() => info!("run {name} is empty, skipping"),
            Ok(rows) => {
                let color = PALETTE[index % PALETTE.len()];
                runs.push(build_series(name, color, &rows, filter));
            }
            Err(err) => {
                warn!("failed to load run {name}: {err:#}");
                failed.push(RunFailure {
                    name: name.clone(),
                    error: format!("{err:#}"),
                });
            }
        }
    }

    Ok(RunComparison {
        filtered: filter,
        runs,
        failed,
    })
}
