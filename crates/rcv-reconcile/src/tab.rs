use std::collections::BTreeSet;

use tracing::{error, info, info_span};

use crate::{OrderFeed, OrderOutcome, OrderStatus, ReconcileOptions, RowSource, TabReport, TabSession};

/// Reconcile every purchase order listed on one tab.
///
/// Order numbers are read from the order column starting at the first data
/// row. Empty cells are skipped and each order number is processed once, in
/// order of first appearance. A fresh [`TabSession`] is used, so the
/// partial-receipt cursor starts over at the first data row.
///
/// One order's failure never stops the tab. Only a failure to read the order
/// column marks the whole tab failed.
pub fn reconcile_tab<S, F>(
    tab: &str,
    source: &mut S,
    feed: &mut F,
    options: &ReconcileOptions,
) -> TabReport
where
    S: RowSource + ?Sized,
    F: OrderFeed + ?Sized,
{
    let span = info_span!("tab", tab);
    let _guard = span.enter();

    let column = match source.col_values(options.layout.order_column) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "could not read order numbers");
            return TabReport::failed(tab, e.to_string());
        }
    };

    let skip = options.layout.first_data_row.saturating_sub(1);
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut session = TabSession::new(tab, options);
    let mut report = TabReport::new(tab);

    for raw in column.into_iter().skip(skip) {
        let order_id = raw.trim();
        if order_id.is_empty() || !seen.insert(order_id.to_string()) {
            continue;
        }

        let outcome = match feed.observe(order_id) {
            Ok(obs) => {
                let status = OrderStatus::parse(&obs.status);
                session.reconcile_order(order_id, &status, &obs.line_items, source)
            }
            Err(e) => {
                error!(order_id, error = %e, "could not observe order");
                OrderOutcome::upstream_failure(order_id, e.to_string())
            }
        };
        report.orders.push(outcome);
    }

    info!(
        orders = report.orders.len(),
        succeeded = report.succeeded(),
        skipped = report.skipped(),
        failed = report.failed_orders(),
        rows_updated = report.rows_updated(),
        cursor = session.cursor().position(),
        "tab processed"
    );

    report
}
