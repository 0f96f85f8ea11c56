use chrono::Duration;
use serde::Serialize;

use crate::models::Sample;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickLabel {
    /// Unix time in seconds.
    pub timestamp: i64,
    pub text: String,
}

/// Label spacing for a series covering `span`.
pub fn tick_interval_secs(span: Duration) -> i64 {
    if span > Duration::seconds(3600) {
        600
    } else if span > Duration::seconds(1800) {
        60
    } else {
        1
    }
}

/// Label every sample whose whole-second timestamp is a multiple of the interval
/// chosen for the series span.
pub fn tick_labels<'a, I>(series: I) -> Vec<TickLabel>
where
    I: IntoIterator<Item = &'a Sample>,
    I::IntoIter: Clone,
{
    let iter = series.into_iter();
    let mut bounds = iter.clone();
    let Some(first) = bounds.next() else {
        return Vec::new();
    };
    let last = bounds.last().unwrap_or(first);
    let interval = tick_interval_secs(last.timestamp - first.timestamp);

    iter.filter(|sample| sample.timestamp.timestamp().rem_euclid(interval) == 0)
        .map(|sample| TickLabel {
            timestamp: sample.timestamp.timestamp(),
            text: sample.timestamp.format("%H:%M:%S").to_string(),
        })
        .collect()
}
