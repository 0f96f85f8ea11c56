pub mod alerts;
pub mod link;
pub mod parser;

pub use alerts::{AlertState, AlertThresholds};
pub use link::{read_link, LinkEvent};
pub use parser::{parse_line, parse_raw_line, Reading};
