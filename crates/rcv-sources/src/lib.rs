//! rcv-sources
//!
//! File-backed collaborators for the reconciliation core:
//!
//! - [`CsvWorksheet`]: one spreadsheet tab persisted as a CSV file.
//! - [`JsonOrderFeed`]: dashboard observations captured in a JSON file.

mod csv_sheet;
mod json_feed;

pub use csv_sheet::{CsvSheetError, CsvWorksheet};
pub use json_feed::{FeedFileError, JsonOrderFeed};
