pub mod console;
pub mod controller;

pub use console::{parse_command, run_console, ConsoleCommand};
pub use controller::{MonitorController, SampleStatus};
