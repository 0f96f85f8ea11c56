use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::{
    config::DEFAULT_TABLE_CAPACITY,
    db::{Database, LogRow},
    errors::TableError,
};

pub const COLUMN_COUNT: usize = 4;

const EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Time,
    Reactor,
    Vapor,
    Comment,
}

impl Column {
    pub const ALL: [Column; COLUMN_COUNT] =
        [Column::Time, Column::Reactor, Column::Vapor, Column::Comment];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_editable(self) -> bool {
        self == Column::Comment
    }
}

/// Language of the column header labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    fn headers(self) -> [&'static str; COLUMN_COUNT] {
        match self {
            Locale::En => ["Time", "Reactor", "Vapor", "Comment"],
            Locale::Ru => ["Время", "Реактор", "Пар", "Комментарий"],
        }
    }
}

/// Change notifications for whoever presents the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    /// The whole cache was replaced.
    Reset { rows: usize },
    CellChanged { row: usize, column: usize },
}

/// Editable window over the newest rows of one run table.
///
/// Holds at most `capacity` rows in ascending row-id order. `reload` and `set_comment`
/// take `&mut self`, so a reload can never observe a half-applied edit or the reverse.
pub struct BoundedTableView {
    db: Database,
    table: String,
    capacity: usize,
    locale: Locale,
    cache: Vec<LogRow>,
    events: broadcast::Sender<ViewEvent>,
}

impl BoundedTableView {
    pub fn new(db: Database, table: impl Into<String>) -> Self {
        Self::with_capacity(db, table, DEFAULT_TABLE_CAPACITY)
    }

    /// Create an empty view; call [`reload`](Self::reload) to fill it.
    pub fn with_capacity(db: Database, table: impl Into<String>, capacity: usize) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            db,
            table: table.into(),
            capacity,
            locale: Locale::default(),
            cache: Vec::new(),
            events,
        }
    }

    /// Create a view and load it immediately.
    pub async fn open(
        db: Database,
        table: impl Into<String>,
        capacity: usize,
    ) -> Result<Self, TableError> {
        let mut view = Self::with_capacity(db, table, capacity);
        view.reload().await?;
        Ok(view)
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    /// Replace the cache with the newest `capacity` rows of the table.
    ///
    /// The new rows are fetched in full before the cache is swapped, so a storage failure
    /// leaves the previous contents in place.
    pub async fn reload(&mut self) -> Result<(), TableError> {
        let rows = self.db.fetch_recent_rows(&self.table, self.capacity).await?;
        self.cache = rows;
        let _ = self.events.send(ViewEvent::Reset {
            rows: self.cache.len(),
        });
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.cache.len()
    }

    pub fn column_count(&self) -> usize {
        COLUMN_COUNT
    }

    pub fn rows(&self) -> &[LogRow] {
        &self.cache
    }

    pub fn value_at(&self, row: usize, column: usize) -> Result<String, TableError> {
        let (entry, column) = self.cell(row, column)?;
        Ok(match column {
            Column::Time => entry.time.clone(),
            Column::Reactor => display_float(entry.reactor),
            Column::Vapor => display_float(entry.vapor),
            Column::Comment => entry.comment.clone(),
        })
    }

    pub fn is_editable(&self, column: usize) -> bool {
        Column::from_index(column).is_some_and(Column::is_editable)
    }

    /// Grid-style setter. Only the comment column accepts edits; any other column
    /// returns `Ok(false)` and leaves cache and storage untouched.
    pub async fn set_value(
        &mut self,
        row: usize,
        column: usize,
        value: &str,
    ) -> Result<bool, TableError> {
        let (_, column) = self.cell(row, column)?;
        if !column.is_editable() {
            return Ok(false);
        }
        self.set_comment(row, value).await?;
        Ok(true)
    }

    /// Trim `value`, persist it to the row's stable id, then update the cached row.
    pub async fn set_comment(&mut self, row: usize, value: &str) -> Result<(), TableError> {
        let (entry, _) = self.cell(row, Column::Comment.index())?;
        let row_id = entry.row_id;
        let comment = value.trim().to_string();

        self.db.update_comment(&self.table, row_id, &comment).await?;

        if let Some(entry) = self.cache.get_mut(row) {
            entry.comment = comment;
        }
        let _ = self.events.send(ViewEvent::CellChanged {
            row,
            column: Column::Comment.index(),
        });
        Ok(())
    }

    pub fn header(&self, column: usize) -> Result<&'static str, TableError> {
        self.locale
            .headers()
            .get(column)
            .copied()
            .ok_or(TableError::ColumnOutOfRange {
                column,
                columns: COLUMN_COUNT,
            })
    }

    fn cell(&self, row: usize, column: usize) -> Result<(&LogRow, Column), TableError> {
        let out_of_range = || TableError::OutOfRange {
            row,
            column,
            rows: self.cache.len(),
            columns: COLUMN_COUNT,
        };
        let column = Column::from_index(column).ok_or_else(out_of_range)?;
        let entry = self.cache.get(row).ok_or_else(out_of_range)?;
        Ok((entry, column))
    }
}

/// Format a temperature the way the chart labels do: whole numbers keep one decimal.
pub fn display_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
