//! End-to-end tests driving the built binary against a temp store.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn refclerk(store: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_refclerk"))
        .arg("--store")
        .arg(store)
        .args(args)
        .output()
        .expect("run refclerk")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn allocates_sequentially_and_queries() {
    let dir = TempDir::new().expect("temp dir");
    let store = dir.path().join("references.json");

    let first = refclerk(&store, &["allocate", "hr"]);
    assert!(first.status.success(), "allocate failed: {first:?}");
    assert_eq!(stdout(&first), "HR 1");

    let second = refclerk(&store, &["allocate", "hr"]);
    assert_eq!(stdout(&second), "HR 2");

    let query = refclerk(&store, &["query", "hr"]);
    assert!(query.status.success());
    assert_eq!(stdout(&query), "HR 2");
}

#[test]
fn override_resets_and_allocation_continues() {
    let dir = TempDir::new().expect("temp dir");
    let store = dir.path().join("references.json");

    refclerk(&store, &["allocate", "hr"]);
    let output = refclerk(&store, &["override", "hr", "100"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "HR 100");

    let next = refclerk(&store, &["allocate", "hr"]);
    assert_eq!(stdout(&next), "HR 101");
}

#[test]
fn unknown_category_fails_without_touching_the_store() {
    let dir = TempDir::new().expect("temp dir");
    let store = dir.path().join("references.json");

    let output = refclerk(&store, &["allocate", "xyz"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown category"), "stderr: {stderr}");
    assert!(!store.exists(), "failed allocation must not create the store");
}

#[test]
fn query_before_any_allocation_reports_not_found() {
    let dir = TempDir::new().expect("temp dir");
    let store = dir.path().join("references.json");

    let output = refclerk(&store, &["query", "s"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no reference issued yet"), "stderr: {stderr}");
}

#[test]
fn store_location_comes_from_the_environment() {
    let dir = TempDir::new().expect("temp dir");
    let store = dir.path().join("env-store.json");

    let output = Command::new(env!("CARGO_BIN_EXE_refclerk"))
        .env("REFCLERK_STORE", &store)
        .args(["allocate", "sres"])
        .output()
        .expect("run refclerk");
    assert!(output.status.success(), "allocate failed: {output:?}");
    assert_eq!(stdout(&output), "SRES 1");
    assert!(store.exists());
}

#[test]
fn list_and_history_reflect_mutations() {
    let dir = TempDir::new().expect("temp dir");
    let store = dir.path().join("references.json");

    refclerk(&store, &["allocate", "hr"]);
    refclerk(&store, &["allocate", "s"]);
    refclerk(&store, &["override", "hr", "9"]);

    let list = refclerk(&store, &["list", "--json"]);
    assert!(list.status.success());
    let records: serde_json::Value =
        serde_json::from_str(&stdout(&list)).expect("parse list JSON");
    let records = records.as_array().expect("array");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["category"], "hr");
    assert_eq!(records[0]["number"], 9);

    let history = refclerk(&store, &["history"]);
    assert!(history.status.success());
    let lines: Vec<_> = stdout(&history).lines().map(str::to_string).collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[2].contains("overridden HR 9 (was 1)"), "line: {}", lines[2]);

    let filtered = refclerk(&store, &["history", "--category", "s"]);
    assert_eq!(stdout(&filtered).lines().count(), 1);
}

#[test]
fn corrupt_store_refuses_to_allocate() {
    let dir = TempDir::new().expect("temp dir");
    let store = dir.path().join("references.json");
    std::fs::write(&store, "{ not json").expect("write");

    let output = refclerk(&store, &["allocate", "hr"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("corrupt"), "stderr: {stderr}");
    // The broken file must be left intact for operator recovery.
    assert_eq!(std::fs::read_to_string(&store).expect("read"), "{ not json");
}
