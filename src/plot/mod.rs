pub mod buffer;
pub mod ticks;

pub use buffer::{PlotFrame, SeriesView, SlidingPlotBuffer};
pub use ticks::{tick_interval_secs, tick_labels, TickLabel};
