//! Per-order reconciliation for one tab.
//!
//! # Invariants
//!
//! - Dispatch is on the closed [`OrderStatus`] set. `Pending` and
//!   `Unrecognized` never read or write the sheet. `Received` matches through
//!   a fresh [`RowIndex`] built per order; `PartiallyReceived` matches through
//!   the session's forward-only cursor.
//! - [`TabSession::reconcile_order`] always returns an [`OrderOutcome`]. It
//!   never panics and never propagates; a row source error becomes
//!   [`OrderDisposition::Failed`] and the remaining items of that order are
//!   not attempted.
//! - Only the notes and quantity cells of matched rows are written.
//! - On the `Received` path, rows whose notes were written before a failure
//!   are still reported as matched, so the outcome accounts for every row
//!   the sheet shows as changed. On the `PartiallyReceived` path a failed
//!   quantity write can leave one row with notes set that is not reported.

use tracing::{debug, error, info, warn};

use crate::{
    classify, ClassifiedItem, Classification, ColumnLayout, ItemReport, LineItem, MatchOutcome, OrderDisposition,
    OrderOutcome, OrderSkipReason, OrderStatus, ReconcileOptions, ReconciliationCursor, RowIndex,
    RowSource, SequentialMatcher, SheetError,
};

/// Reconciliation state for one spreadsheet tab.
///
/// Owns the partial-receipt cursor. Create a fresh session per tab; the
/// cursor starts at the first data row and is shared by every order
/// reconciled through this session.
#[derive(Debug)]
pub struct TabSession<'a> {
    tab: String,
    options: &'a ReconcileOptions,
    cursor: ReconciliationCursor,
}

impl<'a> TabSession<'a> {
    pub fn new(tab: impl Into<String>, options: &'a ReconcileOptions) -> Self {
        Self {
            tab: tab.into(),
            options,
            cursor: ReconciliationCursor::start(options.layout.first_data_row),
        }
    }

    pub fn tab(&self) -> &str {
        &self.tab
    }

    pub fn cursor(&self) -> ReconciliationCursor {
        self.cursor
    }

    /// Reconcile one purchase order.
    ///
    /// Never panics and never propagates: upstream failures become
    /// [`OrderDisposition::Failed`] and the caller moves on to the next order.
    pub fn reconcile_order<S: RowSource + ?Sized>(
        &mut self,
        order_id: &str,
        status: &OrderStatus,
        items: &[LineItem],
        source: &mut S,
    ) -> OrderOutcome {
        let mut outcome = OrderOutcome {
            order_id: order_id.to_string(),
            status: Some(status.clone()),
            disposition: OrderDisposition::Reconciled,
            items: Vec::new(),
        };

        let result = match status {
            OrderStatus::Pending => {
                info!(tab = %self.tab, order_id, "status is 'Pending'; skipping");
                outcome.disposition = OrderDisposition::Skipped {
                    reason: OrderSkipReason::Pending,
                };
                return outcome;
            }
            OrderStatus::Unrecognized(label) => {
                warn!(
                    tab = %self.tab,
                    order_id,
                    label = %label,
                    "unrecognized order status; skipping"
                );
                outcome.disposition = OrderDisposition::Skipped {
                    reason: OrderSkipReason::UnrecognizedStatus {
                        label: label.clone(),
                    },
                };
                return outcome;
            }
            OrderStatus::Received => {
                self.reconcile_received(order_id, items, source, &mut outcome.items)
            }
            OrderStatus::PartiallyReceived => {
                self.reconcile_partial(order_id, items, source, &mut outcome.items)
            }
        };

        match result {
            Ok(()) => {
                let matched = outcome.count_matching(MatchOutcome::is_matched);
                let no_match = outcome.count_matching(MatchOutcome::is_no_match);
                info!(
                    tab = %self.tab,
                    order_id,
                    status = status.as_label(),
                    matched,
                    no_match,
                    rows = outcome.matched_rows().len(),
                    "order reconciled"
                );
            }
            Err(e) => {
                error!(tab = %self.tab, order_id, error = %e, "could not reconcile order");
                outcome.disposition = OrderDisposition::Failed {
                    error: e.to_string(),
                };
            }
        }

        outcome
    }

    fn reconcile_received<S: RowSource + ?Sized>(
        &self,
        order_id: &str,
        items: &[LineItem],
        source: &mut S,
        reports: &mut Vec<ItemReport>,
    ) -> Result<(), SheetError> {
        let tab = self.tab.as_str();
        let layout = &self.options.layout;
        let awaiting = self.options.awaiting_label.as_str();
        let mut index = RowIndex::build(&source.all_values()?, layout);

        for item in items {
            let outcome = match classify_logged(tab, order_id, item, awaiting) {
                Err(skipped) => skipped,
                Ok(eligible) => {
                    let rows = index.consume(&eligible.key);
                    if rows.is_empty() {
                        MatchOutcome::NoMatch
                    } else {
                        let notes = eligible.key.quantity.to_string();
                        let mut written = Vec::with_capacity(rows.len());
                        if let Err(e) =
                            move_to_notes(source, &rows, &notes, layout, &mut written)
                        {
                            if !written.is_empty() {
                                let partial = MatchOutcome::Matched { rows: written };
                                record(tab, order_id, item, partial, reports);
                            }
                            return Err(e);
                        }
                        MatchOutcome::Matched { rows: written }
                    }
                }
            };
            record(tab, order_id, item, outcome, reports);
        }

        Ok(())
    }

    fn reconcile_partial<S: RowSource + ?Sized>(
        &mut self,
        order_id: &str,
        items: &[LineItem],
        source: &mut S,
        reports: &mut Vec<ItemReport>,
    ) -> Result<(), SheetError> {
        let last_row = source.row_count()?;
        let tab = self.tab.as_str();
        let options = self.options;
        let mut matcher = SequentialMatcher::new(&mut self.cursor, &options.layout, last_row);

        for item in items {
            let outcome = match classify_logged(tab, order_id, item, &options.awaiting_label) {
                Err(skipped) => skipped,
                Ok(eligible) => matcher.match_item(source, &eligible)?,
            };
            record(tab, order_id, item, outcome, reports);
        }

        Ok(())
    }
}

/// Move `notes` into the notes cell and clear the quantity of each row.
/// `written` collects every row whose notes cell was set, including one
/// whose quantity write then failed.
fn move_to_notes<S: RowSource + ?Sized>(
    source: &mut S,
    rows: &[usize],
    notes: &str,
    layout: &ColumnLayout,
    written: &mut Vec<usize>,
) -> Result<(), SheetError> {
    for &row in rows {
        source.update_cell(row, layout.notes_column, notes)?;
        written.push(row);
        source.update_cell(row, layout.quantity_column, "")?;
    }
    Ok(())
}

/// Classify and log a skip. `Err` carries the skip outcome to record.
fn classify_logged(
    tab: &str,
    order_id: &str,
    item: &LineItem,
    awaiting_label: &str,
) -> Result<ClassifiedItem, MatchOutcome> {
    match classify(item, awaiting_label) {
        Classification::Eligible(eligible) => Ok(eligible),
        Classification::Skipped(reason) => {
            debug!(
                tab,
                order_id,
                name = %item.name,
                quantity = %item.quantity,
                status = %item.status,
                reason = reason.as_str(),
                "line item skipped"
            );
            Err(MatchOutcome::Skipped { reason })
        }
    }
}

fn record(
    tab: &str,
    order_id: &str,
    item: &LineItem,
    outcome: MatchOutcome,
    reports: &mut Vec<ItemReport>,
) {
    match &outcome {
        MatchOutcome::Matched { rows } => {
            for row in rows {
                info!(
                    tab,
                    order_id,
                    row,
                    name = %item.name,
                    quantity = %item.quantity,
                    "moved quantity to notes"
                );
            }
        }
        MatchOutcome::NoMatch => {
            warn!(
                tab,
                order_id,
                name = %item.name,
                quantity = %item.quantity,
                "line item not found in sheet"
            );
        }
        MatchOutcome::Skipped { .. } => {}
    }

    reports.push(ItemReport {
        name: item.name.clone(),
        quantity: item.quantity.clone(),
        outcome,
    });
}
