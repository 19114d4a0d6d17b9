//! `rcv reconcile`: run every configured tab and report.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rcv_reconcile::{reconcile_tab, OrderFeed, ReconcileOptions, TabReport};
use rcv_sources::{CsvWorksheet, JsonOrderFeed};
use serde::Serialize;
use tracing::{error, info};

/// Default workbook directory when `--workbook` is not given.
pub const ENV_WORKBOOK_DIR: &str = "RCV_WORKBOOK_DIR";

pub struct ReconcileArgs {
    pub config_paths: Vec<String>,
    pub workbook: Option<String>,
    pub observations: String,
    pub report: Option<String>,
    pub strict_config: bool,
    pub dry_run: bool,
}

/// Machine-readable record of one run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub generated_at_utc: DateTime<Utc>,
    pub config_hash: String,
    pub workbook_dir: String,
    pub dry_run: bool,
    pub tabs: Vec<TabReport>,
}

impl RunReport {
    pub fn tabs_failed(&self) -> usize {
        self.tabs.iter().filter(|t| t.is_failed()).count()
    }

    pub fn orders(&self) -> usize {
        self.tabs.iter().map(|t| t.orders.len()).sum()
    }

    pub fn succeeded(&self) -> usize {
        self.tabs.iter().map(TabReport::succeeded).sum()
    }

    pub fn skipped(&self) -> usize {
        self.tabs.iter().map(TabReport::skipped).sum()
    }

    pub fn failed_orders(&self) -> usize {
        self.tabs.iter().map(TabReport::failed_orders).sum()
    }

    pub fn rows_updated(&self) -> usize {
        self.tabs.iter().map(TabReport::rows_updated).sum()
    }
}

pub fn run(args: ReconcileArgs) -> Result<()> {
    let loaded = super::load_config(&args.config_paths)?;
    let settings = loaded.settings()?;
    super::unused_keys(&loaded, args.strict_config)?;
    let options = super::reconcile_options(&settings);

    let workbook_dir = resolve_workbook_dir(args.workbook)?;
    let mut feed = JsonOrderFeed::from_path(&args.observations)
        .with_context(|| format!("failed to load observations: {}", args.observations))?;

    info!(
        config_hash = %loaded.config_hash,
        workbook = %workbook_dir.display(),
        tabs = settings.workbook.tabs.len(),
        orders_observed = feed.len(),
        dry_run = args.dry_run,
        "reconcile run starting"
    );

    let tabs = run_tabs(
        &settings.workbook.tabs,
        &workbook_dir,
        &mut feed,
        &options,
        args.dry_run,
    );

    let report = RunReport {
        generated_at_utc: Utc::now(),
        config_hash: loaded.config_hash.clone(),
        workbook_dir: workbook_dir.display().to_string(),
        dry_run: args.dry_run,
        tabs,
    };

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report).context("serialize run report failed")?;
        fs::write(path, json).with_context(|| format!("write run report failed: {path}"))?;
    }

    print_summary(&report);
    Ok(())
}

/// Process tabs in order. A tab that cannot be opened or saved is reported
/// failed; the run moves on to the next tab.
pub fn run_tabs<F: OrderFeed + ?Sized>(
    tabs: &[String],
    workbook_dir: &Path,
    feed: &mut F,
    options: &ReconcileOptions,
    dry_run: bool,
) -> Vec<TabReport> {
    let mut out = Vec::with_capacity(tabs.len());

    for tab in tabs {
        let path = workbook_dir.join(format!("{tab}.csv"));
        let mut sheet = match CsvWorksheet::open(&path) {
            Ok(s) => s,
            Err(e) => {
                error!(tab = %tab, error = %e, "could not open tab");
                out.push(TabReport::failed(tab.as_str(), e.to_string()));
                continue;
            }
        };

        let mut report = reconcile_tab(tab, &mut sheet, feed, options);

        if !dry_run && sheet.is_dirty() {
            info!(
                tab = %tab,
                path = %sheet.path().display(),
                writes = sheet.writes(),
                "saving tab"
            );
            if let Err(e) = sheet.save() {
                error!(tab = %tab, error = %e, "could not save tab");
                report.error = Some(e.to_string());
            }
        }
        out.push(report);
    }

    out
}

fn resolve_workbook_dir(flag: Option<String>) -> Result<PathBuf> {
    let dir = match flag.or_else(|| std::env::var(ENV_WORKBOOK_DIR).ok()) {
        Some(d) if !d.trim().is_empty() => PathBuf::from(d),
        _ => bail!("no workbook directory: pass --workbook or set {ENV_WORKBOOK_DIR}"),
    };
    if !dir.is_dir() {
        bail!("workbook directory does not exist: {}", dir.display());
    }
    Ok(dir)
}

fn print_summary(report: &RunReport) {
    println!("config_hash={}", report.config_hash);
    println!("dry_run={}", report.dry_run);
    for t in &report.tabs {
        match &t.error {
            Some(e) => println!("tab={} status=FAILED error={e}", t.tab),
            None => println!(
                "tab={} status=OK orders={} succeeded={} skipped={} failed={} rows_updated={}",
                t.tab,
                t.orders.len(),
                t.succeeded(),
                t.skipped(),
                t.failed_orders(),
                t.rows_updated()
            ),
        }
    }
    println!("tabs={}", report.tabs.len());
    println!("tabs_failed={}", report.tabs_failed());
    println!("orders={}", report.orders());
    println!("orders_succeeded={}", report.succeeded());
    println!("orders_skipped={}", report.skipped());
    println!("orders_failed={}", report.failed_orders());
    println!("rows_updated={}", report.rows_updated());
}
