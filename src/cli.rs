use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_TABLE_CAPACITY;

#[derive(Parser, Debug)]
#[command(name = "hexar", version, about = "Reactor temperature monitor and run log")]
pub struct Cli {
    /// Run database (defaults to the saved setting, then the data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read samples from a device and show them live
    Monitor {
        /// Device or file delivering `reactor;vapor` lines
        #[arg(long)]
        device: Option<PathBuf>,
        /// Start logging into this run right away
        #[arg(long)]
        run: Option<String>,
    },
    /// List logged runs
    Runs,
    /// Print the newest rows of a run
    Show {
        run: String,
        #[arg(long, default_value_t = DEFAULT_TABLE_CAPACITY)]
        limit: usize,
    },
    /// Set the comment of a row shown by `show`
    Comment {
        run: String,
        /// Row number as printed by `show`
        row: usize,
        text: String,
        #[arg(long, default_value_t = DEFAULT_TABLE_CAPACITY)]
        limit: usize,
    },
    /// Compare runs on a minutes-since-start axis (JSON output)
    Compare {
        #[arg(required = true)]
        runs: Vec<String>,
        /// Smooth readings outside the plausible band
        #[arg(long)]
        filter: bool,
    },
    /// Delete runs
    Drop {
        #[arg(required = true)]
        runs: Vec<String>,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Fill a run with synthetic readings
    Generate {
        run: String,
        #[arg(long, default_value = "08:00:00")]
        start: String,
        #[arg(long, default_value_t = 800)]
        points: usize,
        #[arg(long, default_value_t = 245.0)]
        base: f64,
        #[arg(long)]
        seed: Option<u64>,
    },
}
