pub mod cli;
pub mod commands;
pub mod compare;
pub mod config;
pub mod db;
pub mod errors;
pub mod generator;
pub mod ingest;
pub mod models;
pub mod monitor;
pub mod plot;
pub mod settings;
pub mod table;
mod utils;

use clap::Parser;

use cli::Cli;

pub use db::{Database, LogRow, NewLogRow};
pub use errors::{IngestError, RunNameError, TableError};
pub use models::Sample;
pub use plot::SlidingPlotBuffer;
pub use table::BoundedTableView;

/// Entry point of the `hexar` binary.
pub fn run() -> anyhow::Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::debug!("hexar starting: {cli:?}");

    // Samples, operator input and table reloads all run on one thread.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(commands::dispatch(cli))
}
