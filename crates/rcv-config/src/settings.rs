use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Tabs processed when the config names none.
pub const DEFAULT_TABS: &[&str] = &[
    "POSUPK",
    "PO-BPK",
    "PendingPOsKW",
    "PendingPOMarathon",
    "POMarco",
];

/// Typed view of the merged config document.
///
/// Every field has a default, so an empty document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub workbook: WorkbookSettings,
    pub layout: LayoutSettings,
    pub labels: LabelSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookSettings {
    /// Worksheet tabs, processed in this order.
    pub tabs: Vec<String>,
}

impl Default for WorkbookSettings {
    fn default() -> Self {
        Self {
            tabs: DEFAULT_TABS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// 1-based column numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub first_data_row: usize,
    pub name_column: usize,
    pub notes_column: usize,
    pub quantity_column: usize,
    pub order_column: usize,
}

impl Default for LayoutSettings {
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    /// Line-item status that means "not received yet".
    pub awaiting_receipt: String,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            awaiting_receipt: "Receive".to_string(),
        }
    }
}

impl Settings {
    /// Deserialize and validate. Unknown keys are ignored here; see
    /// [`crate::report_unused_keys`].
    pub fn from_config_json(config_json: &Value) -> Result<Self> {
        let settings: Settings = serde_json::from_value(config_json.clone())
            .context("CONFIG_INVALID: config does not match the settings schema")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let l = &self.layout;
        if l.first_data_row < 1 {
            bail!("CONFIG_INVALID: layout.first_data_row must be >= 1");
        }
        for (key, col) in [
            ("name_column", l.name_column),
            ("notes_column", l.notes_column),
            ("quantity_column", l.quantity_column),
            ("order_column", l.order_column),
        ] {
            if col < 1 {
                bail!("CONFIG_INVALID: layout.{key} must be >= 1 (got {col})");
            }
        }
        if l.notes_column == l.quantity_column
            || l.notes_column == l.name_column
            || l.quantity_column == l.name_column
        {
            bail!(
                "CONFIG_INVALID: layout name/notes/quantity columns must differ \
                (name={} notes={} quantity={})",
                l.name_column,
                l.notes_column,
                l.quantity_column
            );
        }

        if self.workbook.tabs.is_empty() {
            bail!("CONFIG_INVALID: workbook.tabs must list at least one tab");
        }
        let mut seen = BTreeSet::new();
        for tab in &self.workbook.tabs {
            if tab.trim().is_empty() {
                bail!("CONFIG_INVALID: workbook.tabs contains an empty tab name");
            }
            if !seen.insert(tab.as_str()) {
                bail!("CONFIG_INVALID: workbook.tabs lists '{tab}' more than once");
            }
        }

        if self.labels.awaiting_receipt.trim().is_empty() {
            bail!("CONFIG_INVALID: labels.awaiting_receipt must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let s = Settings::from_config_json(&serde_json::json!({})).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.workbook.tabs.len(), 5);
        assert_eq!(s.layout.order_column, 13);
        assert_eq!(s.labels.awaiting_receipt, "Receive");
    }

    #[test]
    fn partial_layout_keeps_other_defaults() {
        let s = Settings::from_config_json(&serde_json::json!({
            "layout": {"notes_column": 8}
        }))
        .unwrap();
        assert_eq!(s.layout.notes_column, 8);
        assert_eq!(s.layout.quantity_column, 7);
    }

    #[test]
    fn wrong_type_is_invalid() {
        let err = Settings::from_config_json(&serde_json::json!({
            "layout": {"notes_column": "six"}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("CONFIG_INVALID"));
    }
}
