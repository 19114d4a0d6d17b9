//! rcv-reconcile
//!
//! Purchase-order receiving reconciliation engine.
//!
//! Given the line items observed on a purchase-order detail view and a
//! row-addressable spreadsheet tab, the engine decides which rows were
//! received, moves the received quantity into the notes column and clears the
//! quantity column so the row is never matched again.
//!
//! - `Received` orders go through [`RowIndex`] (whole-bucket consumption).
//! - `Partially Received` orders go through [`SequentialMatcher`], which scans
//!   forward from a per-tab [`ReconciliationCursor`].
//! - `Pending` and unrecognized statuses never mutate the sheet.
//!
//! Deterministic, synchronous logic. The only side effects are cell writes
//! through [`RowSource`] and `tracing` events.

mod classify;
mod engine;
mod memory;
mod row_index;
mod sequential;
mod source;
mod tab;
mod types;

pub use classify::{classify, normalize_name, parse_quantity, ClassifiedItem, Classification};
pub use engine::TabSession;
pub use memory::MemorySheet;
pub use row_index::RowIndex;
pub use sequential::{ReconciliationCursor, SequentialMatcher};
pub use source::{FeedError, Observation, OrderFeed, RowSource, SheetError};
pub use tab::reconcile_tab;
pub use types::*;
