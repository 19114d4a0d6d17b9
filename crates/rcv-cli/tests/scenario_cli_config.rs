//! Scenario: config inspection commands.
//!
//! # Invariants under test
//!
//! 1. `config-hash` prints a stable hash and the canonical JSON.
//! 2. `check-config` prints the effective settings and lists unused keys.
//! 3. `check-config --strict` fails on unused keys; invalid settings always fail.
//! 4. A config carrying a credential literal is refused.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn rcv() -> Command {
    let mut cmd = Command::cargo_bin("rcv").unwrap();
    cmd.env("RUST_LOG", "error");
    cmd
}

fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> String {
    let p = dir.path().join(name);
    std::fs::write(&p, body).unwrap();
    p.to_string_lossy().to_string()
}

// ---------------------------------------------------------------------------
// 1. config-hash
// ---------------------------------------------------------------------------

#[test]
fn config_hash_is_stable_across_invocations() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write(&dir, "base.yaml", "layout:\n  notes_column: 8\n");

    let first = rcv().args(["config-hash", cfg.as_str()]).output().unwrap();
    let second = rcv().args(["config-hash", cfg.as_str()]).output().unwrap();

    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
    let out = String::from_utf8(first.stdout).unwrap();
    assert!(out.starts_with("config_hash="));
    assert!(out.contains(r#"{"layout":{"notes_column":8}}"#));
}

#[test]
fn config_hash_requires_a_path() {
    rcv().arg("config-hash").assert().failure();
}

// ---------------------------------------------------------------------------
// 2-3. check-config
// ---------------------------------------------------------------------------

#[test]
fn check_config_prints_effective_settings() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write(
        &dir,
        "site.yaml",
        "workbook:\n  tabs: [POSUPK, POMarco]\nlabels:\n  awaiting_receipt: Await\n",
    );

    rcv()
        .args(["check-config", "--config", cfg.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("tabs=POSUPK,POMarco"))
        .stdout(predicate::str::contains(
            "layout=first_data_row:2 name:1 notes:6 quantity:7 order:13",
        ))
        .stdout(predicate::str::contains("awaiting_label=Await"))
        .stdout(predicate::str::contains("unused_keys=0"));
}

#[test]
fn check_config_without_files_uses_defaults() {
    rcv()
        .arg("check-config")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "tabs=POSUPK,PO-BPK,PendingPOsKW,PendingPOMarathon,POMarco",
        ));
}

#[test]
fn check_config_lists_unused_keys_and_strict_fails() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write(&dir, "typo.yaml", "layuot:\n  notes_column: 8\n");

    rcv()
        .args(["check-config", "--config", cfg.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("unused_keys=1"))
        .stdout(predicate::str::contains("unused_key=/layuot/notes_column"));

    rcv()
        .args(["check-config", "--strict", "--config", cfg.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_UNUSED_KEYS"));
}

#[test]
fn invalid_layout_fails() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write(&dir, "bad.yaml", "layout:\n  notes_column: 7\n");

    rcv()
        .args(["check-config", "--config", cfg.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_INVALID"));
}

// ---------------------------------------------------------------------------
// 4. Secrets
// ---------------------------------------------------------------------------

#[test]
fn credential_literal_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write(&dir, "leak.yaml", "dashboard:\n  token: sq0atp-abcdefghijklmnop\n");

    rcv()
        .args(["check-config", "--config", cfg.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_SECRET_DETECTED"))
        .stderr(predicate::str::contains("sq0atp-abcdefghijklmnop").not());
}
