use serde::{Deserialize, Serialize};

/// Default label the dashboard shows on a line item that still has to be received.
pub const DEFAULT_AWAITING_LABEL: &str = "Receive";

/// One line item as observed on a purchase-order detail view.
///
/// All fields are kept as the raw text the dashboard displayed. `status` is an
/// opaque label rather than an enum because the dashboard may introduce new
/// values at any time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: String,
    pub status: String,
}

impl LineItem {
    pub fn new(
        name: impl Into<String>,
        quantity: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            status: status.into(),
        }
    }
}

/// Normalized `(name, quantity)` pair used to associate line items with rows.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MatchKey {
    /// Trimmed, lower-cased name.
    pub name: String,
    /// Quantity parsed as a float and truncated to an integer.
    pub quantity: i64,
}

impl MatchKey {
    /// Build a key, normalizing `name`.
    pub fn new(name: &str, quantity: i64) -> Self {
        Self {
            name: crate::normalize_name(name),
            quantity,
        }
    }
}

/// Order status as shown on the purchase-order list.
///
/// Closed set of known labels plus an explicit arm for anything else, so new
/// dashboard wording is a typed branch instead of a silent fallthrough.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    PartiallyReceived,
    Received,
    Unrecognized(String),
}

impl OrderStatus {
    /// Parse the dashboard label. Surrounding whitespace is ignored; the label
    /// text itself must match exactly.
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "Pending" => OrderStatus::Pending,
            "Partially Received" => OrderStatus::PartiallyReceived,
            "Received" => OrderStatus::Received,
            other => OrderStatus::Unrecognized(other.to_string()),
        }
    }

    pub fn as_label(&self) -> &str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::PartiallyReceived => "Partially Received",
            OrderStatus::Received => "Received",
            OrderStatus::Unrecognized(label) => label.as_str(),
        }
    }
}

/// Why a line item never reached matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    StillAwaitingReceipt,
    EmptyQuantity,
    UnparsableQuantity,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::StillAwaitingReceipt => "still-awaiting-receipt",
            SkipReason::EmptyQuantity => "empty-quantity",
            SkipReason::UnparsableQuantity => "unparsable-quantity",
        }
    }
}

/// Result of attempting to match one line item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Rows whose quantity was moved to notes, ascending. Sequential matching
    /// always yields exactly one row; whole-bucket matching may yield several.
    Matched { rows: Vec<usize> },
    NoMatch,
    Skipped { reason: SkipReason },
}

impl MatchOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchOutcome::Matched { .. })
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, MatchOutcome::NoMatch)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, MatchOutcome::Skipped { .. })
    }

    /// Rows touched by this outcome (empty unless matched).
    pub fn rows(&self) -> &[usize] {
        match self {
            MatchOutcome::Matched { rows } => rows,
            _ => &[],
        }
    }
}

/// Per-item evidence for the report sink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub name: String,
    pub quantity: String,
    #[serde(flatten)]
    pub outcome: MatchOutcome,
}

/// Why an order was left untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderSkipReason {
    Pending,
    UnrecognizedStatus { label: String },
}

/// Order-level result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "disposition", rename_all = "snake_case")]
pub enum OrderDisposition {
    /// Items were classified and matched. Includes vacuous success (no
    /// eligible items) and clean no-matches.
    Reconciled,
    /// Status did not call for any mutation.
    Skipped { reason: OrderSkipReason },
    /// Line items or row data could not be obtained, or a write failed.
    /// Items handled before the failure keep their reports, including rows
    /// already written for the item that failed.
    Failed { error: String },
}

/// Everything the caller needs to log one order and move on to the next.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrderOutcome {
    pub order_id: String,
    /// `None` when the status could not be observed at all.
    pub status: Option<OrderStatus>,
    pub disposition: OrderDisposition,
    pub items: Vec<ItemReport>,
}

impl OrderOutcome {
    /// Outcome for an order whose observation failed upstream.
    pub fn upstream_failure(order_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            status: None,
            disposition: OrderDisposition::Failed {
                error: error.into(),
            },
            items: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.disposition == OrderDisposition::Reconciled
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.disposition, OrderDisposition::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.disposition, OrderDisposition::Failed { .. })
    }

    /// All rows updated for this order, in the order they were written.
    pub fn matched_rows(&self) -> Vec<usize> {
        self.items
            .iter()
            .flat_map(|i| i.outcome.rows().iter().copied())
            .collect()
    }

    pub fn count_matching(&self, pred: impl Fn(&MatchOutcome) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.outcome)).count()
    }
}

/// Result of processing every order of one spreadsheet tab.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TabReport {
    pub tab: String,
    pub orders: Vec<OrderOutcome>,
    /// Set when the tab could not be processed at all.
    pub error: Option<String>,
}

impl TabReport {
    pub fn new(tab: impl Into<String>) -> Self {
        Self {
            tab: tab.into(),
            orders: Vec::new(),
            error: None,
        }
    }

    pub fn failed(tab: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tab: tab.into(),
            orders: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn succeeded(&self) -> usize {
        self.orders.iter().filter(|o| o.is_success()).count()
    }

    pub fn skipped(&self) -> usize {
        self.orders.iter().filter(|o| o.is_skipped()).count()
    }

    pub fn failed_orders(&self) -> usize {
        self.orders.iter().filter(|o| o.is_failed()).count()
    }

    pub fn rows_updated(&self) -> usize {
        self.orders.iter().map(|o| o.matched_rows().len()).sum()
    }
}

/// 1-based column numbers and the first data row of a tab.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub first_data_row: usize,
    pub name_column: usize,
    pub notes_column: usize,
    pub quantity_column: usize,
    pub order_column: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            first_data_row: 2,
            name_column: 1,
            notes_column: 6,
            quantity_column: 7,
            order_column: 13,
        }
    }
}

/// Knobs shared by every order of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub layout: ColumnLayout,
    /// Line-item status meaning "not received yet" (compared case-insensitively).
    pub awaiting_label: String,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            layout: ColumnLayout::default(),
            awaiting_label: DEFAULT_AWAITING_LABEL.to_string(),
        }
    }
}
