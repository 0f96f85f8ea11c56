pub mod log_row;
pub mod run;

pub use log_row::{LogRow, NewLogRow};
pub use run::RunSummary;
