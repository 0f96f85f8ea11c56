pub mod connection;
pub mod helpers;
pub mod models;
mod repositories;
mod schema;

pub use connection::Database;
pub use helpers::sanitize_run_name;
pub use models::{LogRow, NewLogRow, RunSummary};
