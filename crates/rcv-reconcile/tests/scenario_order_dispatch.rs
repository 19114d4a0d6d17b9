//! Scenario: Order dispatch, classification skips and failure isolation.
//!
//! # Invariants under test
//!
//! 1. Pending orders are skipped without reading or writing the sheet.
//! 2. Unrecognized status text is a typed skip, never a mutation.
//! 3. Awaiting-receipt, empty and unparsable items never reach matching, on
//!    either matching path.
//! 4. An order with no eligible items is a (vacuous) success.
//! 5. Row source read/write failures mark the order failed instead of
//!    propagating. Rows written before a failed write are still reported.

use rcv_reconcile::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sheet() -> MemorySheet {
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (name, qty) in [("Name", "Qty"), ("Bolt", "4"), ("Nut", "2"), ("Widget", "5")] {
        let mut r = vec![String::new(); 7];
        r[0] = name.to_string();
        r[6] = qty.to_string();
        rows.push(r);
    }
    MemorySheet::from_rows(rows)
}

fn run(status: OrderStatus, items: &[LineItem], s: &mut MemorySheet) -> OrderOutcome {
    let options = ReconcileOptions::default();
    let mut session = TabSession::new("POSUPK", &options);
    session.reconcile_order("PO-100", &status, items, s)
}

// ---------------------------------------------------------------------------
// 1-2. Status dispatch
// ---------------------------------------------------------------------------

#[test]
fn status_labels_parse_to_closed_variants() {
    assert_eq!(OrderStatus::parse("Pending"), OrderStatus::Pending);
    assert_eq!(
        OrderStatus::parse(" Partially Received "),
        OrderStatus::PartiallyReceived
    );
    assert_eq!(OrderStatus::parse("Received"), OrderStatus::Received);
    assert_eq!(
        OrderStatus::parse("Cancelled"),
        OrderStatus::Unrecognized("Cancelled".to_string())
    );
    assert_eq!(
        OrderStatus::parse("received"),
        OrderStatus::Unrecognized("received".to_string())
    );
}

#[test]
fn pending_order_is_skipped_without_touching_the_sheet() {
    let mut s = sheet();
    // Reads would fail; a pending order must not even try.
    s.fail_reads(true);

    let out = run(
        OrderStatus::Pending,
        &[LineItem::new("Bolt", "4", "Received")],
        &mut s,
    );

    assert!(out.is_skipped());
    assert!(!out.is_success());
    assert_eq!(
        out.disposition,
        OrderDisposition::Skipped {
            reason: OrderSkipReason::Pending
        }
    );
    assert!(out.items.is_empty());
    assert_eq!(s.writes(), 0);
}

#[test]
fn unrecognized_status_is_skipped() {
    let mut s = sheet();
    let out = run(
        OrderStatus::parse("Draft"),
        &[LineItem::new("Bolt", "4", "Received")],
        &mut s,
    );

    assert_eq!(
        out.disposition,
        OrderDisposition::Skipped {
            reason: OrderSkipReason::UnrecognizedStatus {
                label: "Draft".to_string()
            }
        }
    );
    assert_eq!(s.writes(), 0);
}

// ---------------------------------------------------------------------------
// 3. Classification skips on both paths
// ---------------------------------------------------------------------------

#[test]
fn skipped_items_never_reach_matching() {
    for status in [OrderStatus::Received, OrderStatus::PartiallyReceived] {
        let mut s = sheet();
        let out = run(
            status.clone(),
            &[
                LineItem::new("Bolt", "", "Received"),
                LineItem::new("Nut", "2", "Receive"),
                LineItem::new("Widget", "five", "Received"),
            ],
            &mut s,
        );

        let reasons: Vec<MatchOutcome> = out.items.iter().map(|i| i.outcome.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                MatchOutcome::Skipped {
                    reason: SkipReason::EmptyQuantity
                },
                MatchOutcome::Skipped {
                    reason: SkipReason::StillAwaitingReceipt
                },
                MatchOutcome::Skipped {
                    reason: SkipReason::UnparsableQuantity
                },
            ],
            "status {status:?}"
        );
        assert_eq!(s.writes(), 0, "status {status:?}");
        assert_eq!(s.cell(3, 7).unwrap(), "2", "Nut row stays pending");
    }
}

#[test]
fn awaiting_label_is_configurable() {
    let mut s = sheet();
    let options = ReconcileOptions {
        awaiting_label: "To Receive".to_string(),
        ..ReconcileOptions::default()
    };
    let mut session = TabSession::new("POSUPK", &options);

    let out = session.reconcile_order(
        "PO-101",
        &OrderStatus::Received,
        &[
            LineItem::new("Bolt", "4", "to receive"),
            LineItem::new("Nut", "2", "Receive"),
        ],
        &mut s,
    );

    assert!(out.items[0].outcome.is_skipped());
    assert_eq!(out.items[1].outcome, MatchOutcome::Matched { rows: vec![3] });
}

// ---------------------------------------------------------------------------
// 4. Vacuous success
// ---------------------------------------------------------------------------

#[test]
fn order_without_eligible_items_succeeds() {
    let mut s = sheet();
    let out = run(
        OrderStatus::Received,
        &[LineItem::new("Bolt", "4", "Receive")],
        &mut s,
    );
    assert!(out.is_success());

    let out = run(OrderStatus::PartiallyReceived, &[], &mut s);
    assert!(out.is_success());
    assert!(out.items.is_empty());
    assert_eq!(s.writes(), 0);
}

// ---------------------------------------------------------------------------
// 5. Upstream failures are isolated
// ---------------------------------------------------------------------------

#[test]
fn read_failure_marks_order_failed() {
    for status in [OrderStatus::Received, OrderStatus::PartiallyReceived] {
        let mut s = sheet();
        s.fail_reads(true);

        let out = run(
            status.clone(),
            &[LineItem::new("Bolt", "4", "Received")],
            &mut s,
        );

        assert!(out.is_failed(), "status {status:?}");
        match &out.disposition {
            OrderDisposition::Failed { error } => assert!(error.contains("injected read failure")),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}

#[test]
fn write_failure_marks_order_failed() {
    let mut s = sheet();
    s.fail_writes(true);

    let out = run(
        OrderStatus::Received,
        &[LineItem::new("Bolt", "4", "Received")],
        &mut s,
    );

    assert!(out.is_failed());
    assert_eq!(s.cell(2, 7).unwrap(), "4");
}

#[test]
fn rows_written_before_a_write_failure_are_reported() {
    let mut s = MemorySheet::from_rows(vec![
        vec!["Name", "", "", "", "", "", "Qty"],
        vec!["Bolt", "", "", "", "", "", "4"],
        vec!["Widget", "", "", "", "", "", "5"],
        vec!["Widget", "", "", "", "", "", "5"],
        vec!["Widget", "", "", "", "", "", "5"],
    ]);
    // Bolt takes two writes, the first Widget row two more, the second one.
    s.fail_writes_after(5);

    let out = run(
        OrderStatus::Received,
        &[
            LineItem::new("Bolt", "4", "Received"),
            LineItem::new("Widget", "5", "Received"),
            LineItem::new("Nut", "2", "Received"),
        ],
        &mut s,
    );

    assert!(out.is_failed());
    assert_eq!(out.items.len(), 2, "item after the failure is not attempted");
    assert_eq!(out.matched_rows(), vec![2, 3, 4]);
    assert_eq!(out.items[1].outcome, MatchOutcome::Matched { rows: vec![3, 4] });

    assert_eq!(s.cell(3, 6).unwrap(), "5");
    assert_eq!(s.cell(3, 7).unwrap(), "");
    assert_eq!(s.cell(4, 6).unwrap(), "5");
    assert_eq!(s.cell(4, 7).unwrap(), "5", "quantity write failed");
    assert_eq!(s.cell(5, 6).unwrap(), "");
    assert_eq!(s.cell(5, 7).unwrap(), "5");
}

#[test]
fn upstream_failure_outcome_has_no_status() {
    let out = OrderOutcome::upstream_failure("PO-404", "order 'PO-404' not found on dashboard");
    assert!(out.is_failed());
    assert_eq!(out.status, None);
    assert!(out.items.is_empty());
}

#[test]
fn outcomes_serialize_for_the_report_sink() {
    let mut s = sheet();
    let out = run(
        OrderStatus::Received,
        &[
            LineItem::new("Bolt", "4", "Received"),
            LineItem::new("Nut", "", "Received"),
        ],
        &mut s,
    );

    let v = serde_json::to_value(&out).unwrap();
    assert_eq!(v["order_id"], "PO-100");
    assert_eq!(v["status"]["kind"], "received");
    assert_eq!(v["disposition"]["disposition"], "reconciled");
    assert_eq!(v["items"][0]["outcome"], "matched");
    assert_eq!(v["items"][0]["rows"][0], 2);
    assert_eq!(v["items"][1]["outcome"], "skipped");
    assert_eq!(v["items"][1]["reason"], "empty-quantity");
}
