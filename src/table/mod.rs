pub mod view;

pub use view::{BoundedTableView, Column, Locale, ViewEvent, COLUMN_COUNT};
