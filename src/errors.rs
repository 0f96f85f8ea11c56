use thiserror::Error;

/// A device line that could not be turned into a sample.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestError {
    #[error("expected 2 fields separated by ';', got {0}")]
    FieldCount(usize),
    #[error("field {index} is not a number: {value:?}")]
    NotNumeric { index: usize, value: String },
    #[error("line is not valid UTF-8")]
    Encoding,
}

/// Failures of the bounded table view.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
    #[error("cell ({row}, {column}) is outside a view of {rows} rows and {columns} columns")]
    OutOfRange {
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },
    #[error("column {column} is outside a view of {columns} columns")]
    ColumnOutOfRange { column: usize, columns: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunNameError {
    #[error("run name is empty after removing characters other than letters, digits and '_'")]
    Empty,
    #[error("run name {0:?} uses the reserved 'sqlite_' prefix")]
    Reserved(String),
}
