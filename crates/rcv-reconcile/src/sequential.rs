//! Partial-receipt matching.
//!
//! Partial receipts of the same purchase order can be reconciled many times,
//! and several rows may carry the same `(name, quantity)`. A forward-only
//! cursor gives a first-fit assignment in the order rows were entered:
//!
//! - **Monotonic**: the cursor only moves forward, to `matched_row + 1`.
//! - **No revisits**: a later item never matches a row at or before an
//!   earlier match within the same tab pass.
//! - **No-match is inert**: a failed scan leaves the cursor where it was.
//!
//! Quantities are compared as trimmed text, not as integers, so `"2.0"` and
//! `"2"` are different quantities on this path.

use crate::{normalize_name, ClassifiedItem, ColumnLayout, MatchOutcome, RowSource, SheetError};

/// Next unconsumed row index for partial-receipt matching within one tab.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReconciliationCursor(usize);

impl ReconciliationCursor {
    /// Cursor positioned at the first data row.
    pub fn start(first_data_row: usize) -> Self {
        Self(first_data_row.max(1))
    }

    pub fn position(&self) -> usize {
        self.0
    }

    fn advance_past(&mut self, row: usize) {
        debug_assert!(row >= self.0, "cursor must never move backwards");
        self.0 = row + 1;
    }
}

/// Matches classified items against rows `cursor..=last_row`.
pub struct SequentialMatcher<'a> {
    cursor: &'a mut ReconciliationCursor,
    layout: &'a ColumnLayout,
    last_row: usize,
}

impl<'a> SequentialMatcher<'a> {
    /// `last_row` is the last row index the scan may reach (inclusive).
    pub fn new(
        cursor: &'a mut ReconciliationCursor,
        layout: &'a ColumnLayout,
        last_row: usize,
    ) -> Self {
        Self {
            cursor,
            layout,
            last_row,
        }
    }

    pub fn cursor(&self) -> ReconciliationCursor {
        *self.cursor
    }

    /// Find the first row at or after the cursor whose name and quantity text
    /// equal the item's; move its quantity to notes and advance the cursor.
    pub fn match_item<S: RowSource + ?Sized>(
        &mut self,
        source: &mut S,
        item: &ClassifiedItem,
    ) -> Result<MatchOutcome, SheetError> {
        for row in self.cursor.position()..=self.last_row {
            let qty = source.cell(row, self.layout.quantity_column)?;
            if qty.trim() != item.quantity_text {
                continue;
            }
            let name = source.cell(row, self.layout.name_column)?;
            if normalize_name(&name) != item.key.name {
                continue;
            }

            source.update_cell(row, self.layout.notes_column, &item.quantity_text)?;
            source.update_cell(row, self.layout.quantity_column, "")?;
            self.cursor.advance_past(row);
            return Ok(MatchOutcome::Matched { rows: vec![row] });
        }

        Ok(MatchOutcome::NoMatch)
    }
}
