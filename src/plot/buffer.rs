use std::collections::VecDeque;

use serde::Serialize;

use crate::{config::PLOT_WINDOW_SAMPLES, models::Sample};

use super::ticks::{tick_labels, TickLabel};

/// Chart data for one run: a fixed-size recent window plus the complete history.
///
/// The recent window is always a suffix of the history. Which one is rendered is
/// chosen by the zoom toggle; switching never touches the data.
#[derive(Debug, Clone)]
pub struct SlidingPlotBuffer {
    recent: VecDeque<Sample>,
    history: Vec<Sample>,
    capacity: usize,
    full_range: bool,
}

impl Default for SlidingPlotBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl SlidingPlotBuffer {
    pub fn new() -> Self {
        Self::with_capacity(PLOT_WINDOW_SAMPLES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            recent: VecDeque::with_capacity(capacity + 1),
            history: Vec::new(),
            capacity,
            full_range: false,
        }
    }

    pub fn append(&mut self, sample: Sample) {
        self.history.push(sample);
        self.recent.push_back(sample);
        if self.recent.len() > self.capacity {
            self.recent.pop_front();
        }
    }

    /// Switch between the recent window and the full history; returns the new mode.
    pub fn toggle_scale(&mut self) -> bool {
        self.full_range = !self.full_range;
        self.full_range
    }

    pub fn is_full_range(&self) -> bool {
        self.full_range
    }

    pub fn recent_window(&self) -> SeriesView<'_> {
        let (head, tail) = self.recent.as_slices();
        SeriesView { head, tail }
    }

    pub fn full_history(&self) -> &[Sample] {
        &self.history
    }

    pub fn current_series(&self) -> SeriesView<'_> {
        if self.full_range {
            SeriesView {
                head: &self.history,
                tail: &[],
            }
        } else {
            self.recent_window()
        }
    }

    /// Renderer-neutral snapshot of the active series.
    pub fn frame(&self) -> PlotFrame {
        let series = self.current_series();
        let x_range = match (series.first(), series.last()) {
            (Some(first), Some(last)) => Some((seconds(first), seconds(last))),
            _ => None,
        };

        PlotFrame {
            full_range: self.full_range,
            x_range,
            reactor: series.iter().map(|s| [seconds(s), s.reactor]).collect(),
            vapor: series.iter().map(|s| [seconds(s), s.vapor]).collect(),
            ticks: tick_labels(series.iter()),
        }
    }
}

fn seconds(sample: &Sample) -> f64 {
    sample.timestamp.timestamp_millis() as f64 / 1000.0
}

/// Borrowed, ordered view over a series that may wrap around the ring buffer.
#[derive(Debug, Clone, Copy)]
pub struct SeriesView<'a> {
    head: &'a [Sample],
    tail: &'a [Sample],
}

impl<'a> SeriesView<'a> {
    pub fn len(&self) -> usize {
        self.head.len() + self.tail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::iter::Chain<std::slice::Iter<'a, Sample>, std::slice::Iter<'a, Sample>> {
        self.head.iter().chain(self.tail.iter())
    }

    pub fn first(&self) -> Option<&'a Sample> {
        self.head.first().or_else(|| self.tail.first())
    }

    pub fn last(&self) -> Option<&'a Sample> {
        self.tail.last().or_else(|| self.head.last())
    }

    pub fn to_vec(&self) -> Vec<Sample> {
        self.iter().copied().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotFrame {
    pub full_range: bool,
    /// First and last timestamp of the active series, in Unix seconds.
    pub x_range: Option<(f64, f64)>,
    pub reactor: Vec<[f64; 2]>,
    pub vapor: Vec<[f64; 2]>,
    pub ticks: Vec<TickLabel>,
}
