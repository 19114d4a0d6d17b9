//! Command handler modules for rcv-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod reconcile;

use anyhow::Result;
use rcv_config::{LoadedConfig, Settings, UnusedKeyPolicy, UnusedKeyReport};
use rcv_reconcile::{ColumnLayout, ReconcileOptions};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Load layered config. No paths means an empty document, i.e. all defaults.
pub fn load_config(paths: &[String]) -> Result<LoadedConfig> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    if path_refs.is_empty() {
        return rcv_config::load_layered_yaml_from_strings(&[]);
    }
    rcv_config::load_layered_yaml(&path_refs)
}

/// Run the unused-key guard, logging each unused key.
pub fn unused_keys(loaded: &LoadedConfig, strict: bool) -> Result<UnusedKeyReport> {
    let policy = if strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = rcv_config::report_unused_keys(&loaded.config_json, policy)?;
    for ptr in &report.unused_leaf_pointers {
        tracing::warn!(key = %ptr, "config key is not used");
    }
    Ok(report)
}

pub fn reconcile_options(settings: &Settings) -> ReconcileOptions {
    let l = &settings.layout;
    ReconcileOptions {
        layout: ColumnLayout {
            first_data_row: l.first_data_row,
            name_column: l.name_column,
            notes_column: l.notes_column,
            quantity_column: l.quantity_column,
            order_column: l.order_column,
        },
        awaiting_label: settings.labels.awaiting_receipt.clone(),
    }
}

/// `rcv check-config`
pub fn check_config(paths: &[String], strict: bool) -> Result<()> {
    let loaded = load_config(paths)?;
    let settings = loaded.settings()?;
    let report = unused_keys(&loaded, strict)?;

    println!("config_hash={}", loaded.config_hash);
    println!("tabs={}", settings.workbook.tabs.join(","));
    println!(
        "layout=first_data_row:{} name:{} notes:{} quantity:{} order:{}",
        settings.layout.first_data_row,
        settings.layout.name_column,
        settings.layout.notes_column,
        settings.layout.quantity_column,
        settings.layout.order_column
    );
    println!("awaiting_label={}", settings.labels.awaiting_receipt);
    println!("unused_keys={}", report.unused_leaf_pointers.len());
    for ptr in &report.unused_leaf_pointers {
        println!("unused_key={ptr}");
    }
    Ok(())
}
