//! Line-item classification.
//!
//! Malformed input is a classification outcome, never an error: every
//! [`LineItem`] maps to exactly one [`Classification`].

use crate::{LineItem, MatchKey, SkipReason};

/// A line item that survived classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedItem {
    /// Name as observed (untrimmed), for reporting.
    pub name: String,
    /// Quantity text after trimming. Sequential matching compares against this.
    pub quantity_text: String,
    pub key: MatchKey,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    Eligible(ClassifiedItem),
    Skipped(SkipReason),
}

/// Trim and lower-case a product name.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Parse quantity text the way the dashboard numbers are read: as a float,
/// truncated toward zero. Non-finite and out-of-range values are rejected.
pub fn parse_quantity(raw: &str) -> Option<i64> {
    let v: f64 = raw.trim().parse().ok()?;
    if !v.is_finite() {
        return None;
    }
    let t = v.trunc();
    if t < i64::MIN as f64 || t >= i64::MAX as f64 {
        return None;
    }
    Some(t as i64)
}

/// Classify one observed line item.
///
/// Checks run in a fixed order: awaiting-receipt status, empty quantity,
/// unparsable quantity.
pub fn classify(item: &LineItem, awaiting_label: &str) -> Classification {
    if item.status.trim().to_lowercase() == awaiting_label.trim().to_lowercase() {
        return Classification::Skipped(SkipReason::StillAwaitingReceipt);
    }

    let quantity_text = item.quantity.trim();
    if quantity_text.is_empty() {
        return Classification::Skipped(SkipReason::EmptyQuantity);
    }

    match parse_quantity(quantity_text) {
        Some(quantity) => Classification::Eligible(ClassifiedItem {
            name: item.name.clone(),
            quantity_text: quantity_text.to_string(),
            key: MatchKey::new(&item.name, quantity),
        }),
        None => Classification::Skipped(SkipReason::UnparsableQuantity),
    }
}
