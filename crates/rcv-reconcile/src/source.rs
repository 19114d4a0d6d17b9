//! Collaborator boundaries.
//!
//! The engine never talks to a spreadsheet backend or a dashboard directly.
//! It sees a tab through [`RowSource`] and the observed purchase orders
//! through [`OrderFeed`]. Concrete implementations live outside this crate
//! (see `rcv-sources`) except for the in-memory [`crate::MemorySheet`].

use std::fmt;

use crate::LineItem;

// ---------------------------------------------------------------------------
// Row source
// ---------------------------------------------------------------------------

/// Errors a [`RowSource`] implementation may return.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetError {
    /// Row and column numbers are 1-based; zero is never a valid address.
    InvalidAddress { row: usize, col: usize },
    /// Reading from the backend failed.
    Read(String),
    /// Writing a cell failed.
    Write {
        row: usize,
        col: usize,
        message: String,
    },
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetError::InvalidAddress { row, col } => {
                write!(f, "invalid cell address row={row} col={col} (1-based)")
            }
            SheetError::Read(msg) => write!(f, "sheet read error: {msg}"),
            SheetError::Write { row, col, message } => {
                write!(f, "sheet write error at row={row} col={col}: {message}")
            }
        }
    }
}

impl std::error::Error for SheetError {}

/// A row-addressable spreadsheet tab.
///
/// Rows and columns passed to [`cell`][RowSource::cell] and
/// [`update_cell`][RowSource::update_cell] are 1-based. Rows returned by
/// [`all_values`][RowSource::all_values] are in ascending row order with
/// 0-based columns. Reading past the populated area yields an empty string.
pub trait RowSource {
    /// Every populated row, row 1 first.
    fn all_values(&self) -> Result<Vec<Vec<String>>, SheetError>;

    /// Text of a single cell.
    fn cell(&self, row: usize, col: usize) -> Result<String, SheetError>;

    /// Overwrite a single cell.
    fn update_cell(&mut self, row: usize, col: usize, value: &str) -> Result<(), SheetError>;

    /// Index of the last known row.
    fn row_count(&self) -> Result<usize, SheetError> {
        Ok(self.all_values()?.len())
    }

    /// Values of one column from row 1 down to its last non-empty cell.
    fn col_values(&self, col: usize) -> Result<Vec<String>, SheetError> {
        if col == 0 {
            return Err(SheetError::InvalidAddress { row: 1, col });
        }
        let mut out: Vec<String> = self
            .all_values()?
            .into_iter()
            .map(|row| row.get(col - 1).cloned().unwrap_or_default())
            .collect();
        while out.last().is_some_and(|v| v.is_empty()) {
            out.pop();
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Order feed
// ---------------------------------------------------------------------------

/// What the dashboard showed for one purchase order.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Observation {
    /// Order status label from the purchase-order list.
    pub status: String,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl Observation {
    pub fn new(status: impl Into<String>, line_items: Vec<LineItem>) -> Self {
        Self {
            status: status.into(),
            line_items,
        }
    }
}

/// Errors an [`OrderFeed`] implementation may return.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedError {
    /// The dashboard has no purchase order with this number.
    NotFound { order_id: String },
    /// The order exists but its detail view could not be read.
    Unavailable { order_id: String, message: String },
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::NotFound { order_id } => {
                write!(f, "order '{order_id}' not found on dashboard")
            }
            FeedError::Unavailable { order_id, message } => {
                write!(f, "order '{order_id}' could not be observed: {message}")
            }
        }
    }
}

impl std::error::Error for FeedError {}

/// Supplies observed status and line items per purchase order.
pub trait OrderFeed {
    fn observe(&mut self, order_id: &str) -> Result<Observation, FeedError>;
}
