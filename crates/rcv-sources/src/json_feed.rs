//! Observation file feed.
//!
//! ```json
//! { "orders": {
//!     "PO-1001": { "status": "Received",
//!                  "line_items": [ { "name": "Widget", "quantity": "5", "status": "Received" } ] },
//!     "PO-1002": { "error": "detail view timed out" } } }
//! ```
//!
//! An entry carrying `error` stands for an order whose detail view could not
//! be read. Order numbers are looked up after trimming.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rcv_reconcile::{FeedError, LineItem, Observation, OrderFeed};
use serde::Deserialize;

#[derive(Debug)]
pub enum FeedFileError {
    Io { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
}

impl fmt::Display for FeedFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedFileError::Io { path, message } => {
                write!(f, "observation file io error at {}: {message}", path.display())
            }
            FeedFileError::Parse { path, message } => {
                write!(f, "observation file {} is invalid: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for FeedFileError {}

#[derive(Debug, Default, Deserialize)]
struct ObservationFile {
    #[serde(default)]
    orders: BTreeMap<String, ObservedEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct ObservedEntry {
    status: Option<String>,
    #[serde(default)]
    line_items: Vec<LineItem>,
    error: Option<String>,
}

/// Serves observations recorded in a JSON file.
#[derive(Debug, Clone, Default)]
pub struct JsonOrderFeed {
    orders: BTreeMap<String, ObservedEntry>,
    observed: Vec<String>,
}

impl JsonOrderFeed {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FeedFileError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| FeedFileError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&raw).map_err(|message| FeedFileError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, FeedFileError> {
        Self::parse(raw).map_err(|message| FeedFileError::Parse {
            path: PathBuf::from("<inline>"),
            message,
        })
    }

    fn parse(raw: &str) -> Result<Self, String> {
        let file: ObservationFile = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        let orders = file
            .orders
            .into_iter()
            .map(|(id, entry)| (id.trim().to_string(), entry))
            .collect();
        Ok(Self {
            orders,
            observed: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn contains(&self, order_id: &str) -> bool {
        self.orders.contains_key(order_id.trim())
    }

    /// Order numbers requested so far, in request order.
    pub fn observed(&self) -> &[String] {
        &self.observed
    }
}

impl OrderFeed for JsonOrderFeed {
    fn observe(&mut self, order_id: &str) -> Result<Observation, FeedError> {
        let order_id = order_id.trim();
        self.observed.push(order_id.to_string());

        let entry = self
            .orders
            .get(order_id)
            .ok_or_else(|| FeedError::NotFound {
                order_id: order_id.to_string(),
            })?;

        if let Some(message) = &entry.error {
            return Err(FeedError::Unavailable {
                order_id: order_id.to_string(),
                message: message.clone(),
            });
        }
        let Some(status) = &entry.status else {
            return Err(FeedError::Unavailable {
                order_id: order_id.to_string(),
                message: "no status recorded".to_string(),
            });
        };

        Ok(Observation::new(status.clone(), entry.line_items.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_orders_key_is_an_empty_feed() {
        let feed = JsonOrderFeed::from_json_str("{}").unwrap();
        assert!(feed.is_empty());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = JsonOrderFeed::from_json_str("{\"orders\": [").unwrap_err();
        assert!(matches!(err, FeedFileError::Parse { .. }));
    }

    #[test]
    fn ids_are_trimmed_on_both_sides() {
        let mut feed =
            JsonOrderFeed::from_json_str(r#"{"orders": {" PO-1 ": {"status": "Pending"}}}"#)
                .unwrap();
        assert!(feed.contains("PO-1"));
        let obs = feed.observe("PO-1  ").unwrap();
        assert_eq!(obs.status, "Pending");
        assert!(obs.line_items.is_empty());
        assert_eq!(feed.observed(), &["PO-1".to_string()]);
    }
}
