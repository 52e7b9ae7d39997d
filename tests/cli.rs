//! End-to-end tests for the `govstore` binary.
//!
//! Every run uses a throwaway cache and config file and `--offline`, so no
//! test touches the home directory or the network.

use assert_cmd::Command;
use serde_json::{Value, json};
use tempfile::TempDir;

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("govstore").unwrap();
        cmd.env("GOVSTORE_CONFIG", self.dir.path().join("config.json"))
            .env_remove("GOVSTORE_PREFIX")
            .env_remove("GOVSTORE_QUOTA_BYTES")
            .env_remove("RUST_LOG")
            .arg("--db")
            .arg(self.dir.path().join("cache.db"))
            .arg("--offline")
            .arg("--json");
        cmd
    }

    fn run(&self, args: &[&str]) -> Value {
        let output = self.cmd().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "govstore {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

#[test]
fn test_insert_then_filtered_ordered_select() {
    let env = Env::new();

    env.run(&[
        "insert",
        "shale_batches",
        r#"{"miner_id": "m1", "weight_kg": 1000, "created_at": "2024-01-01"}"#,
    ]);
    env.run(&[
        "insert",
        "shale_batches",
        r#"[{"miner_id": "m1", "weight_kg": 500, "created_at": "2024-03-01"},
            {"miner_id": "m2", "weight_kg": 700, "created_at": "2024-02-01"}]"#,
    ]);

    let out = env.run(&[
        "select",
        "shale_batches",
        "--eq",
        "miner_id=m1",
        "--order",
        "created_at",
        "--desc",
    ]);

    let rows = out["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["weight_kg"], json!(500));
    assert_eq!(rows[1]["weight_kg"], json!(1000));
    assert!(rows.iter().all(|r| r["id"].as_str().is_some_and(|id| id.len() == 36)));
    assert_eq!(out["sync"]["status"], json!("skipped"));
}

#[test]
fn test_insert_reports_generated_id() {
    let env = Env::new();
    let out = env.run(&["insert", "cpr_requests", r#"{"status": "pending"}"#]);

    assert_eq!(out["count"], json!(1));
    assert_eq!(out["local"]["status"], json!("written"));
    assert!(out["data"][0]["id"].is_string());
}

#[test]
fn test_upsert_and_update() {
    let env = Env::new();
    env.run(&["upsert", "profiles", r#"{"id": "u1", "role": "miner", "name": "A"}"#]);
    env.run(&["upsert", "profiles", r#"{"id": "u1", "role": "admin"}"#]);
    env.run(&["update", "profiles", r#"{"verified": true}"#, "--eq", "id=u1"]);

    let out = env.run(&["select", "profiles", "--single", "--eq", "id=u1"]);
    assert_eq!(out["data"]["role"], json!("admin"));
    assert_eq!(out["data"]["name"], json!("A"));
    assert_eq!(out["data"]["verified"], json!(true));
}

#[test]
fn test_select_columns() {
    let env = Env::new();
    env.run(&["insert", "t", r#"{"id": "a", "status": "pending", "n": 1}"#]);

    let out = env.run(&["select", "t", "--columns", "id,status"]);
    assert_eq!(out["data"], json!([{"id": "a", "status": "pending"}]));
}

#[test]
fn test_single_missing_row_fails() {
    let env = Env::new();
    let output = env
        .cmd()
        .args(["select", "profiles", "--single", "--eq", "id=ghost"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let err: Value = serde_json::from_str(stderr.lines().last().unwrap()).unwrap();
    assert_eq!(err["error"]["code"], json!("RECORD_NOT_FOUND"));
}

#[test]
fn test_tables_and_clear() {
    let env = Env::new();
    env.run(&["insert", "a_table", r#"[{"x": 1}, {"x": 2}]"#]);
    env.run(&["insert", "b_table", r#"{"x": 3}"#]);

    let tables = env.run(&["tables"]);
    assert_eq!(
        tables,
        json!([{"table": "a_table", "rows": 2}, {"table": "b_table", "rows": 1}])
    );

    let cleared = env.run(&["clear", "a_table"]);
    assert_eq!(cleared["removed"], json!(true));
    let tables = env.run(&["tables"]);
    assert_eq!(tables, json!([{"table": "b_table", "rows": 1}]));
}

#[test]
fn test_prefix_isolates_tables() {
    let env = Env::new();
    env.run(&["--prefix", "one_", "insert", "t", r#"{"x": 1}"#]);

    let other = env.run(&["--prefix", "two_", "select", "t"]);
    assert_eq!(other["data"], json!([]));
    let same = env.run(&["--prefix", "one_", "select", "t"]);
    assert_eq!(same["data"].as_array().unwrap().len(), 1);
}

#[test]
fn test_invalid_json_is_rejected() {
    let env = Env::new();
    env.cmd()
        .args(["insert", "t", "{not json"])
        .assert()
        .failure()
        .code(4);
}

#[test]
fn test_pull_offline_is_rejected() {
    let env = Env::new();
    env.cmd().args(["pull", "profiles"]).assert().failure().code(4);
}

#[test]
fn test_status_offline() {
    let env = Env::new();
    let out = env.run(&["status"]);
    assert_eq!(out["offline"], json!(true));
    assert_eq!(out["remote_configured"], json!(false));
    assert_eq!(out["prefix"], json!("govchain_db_"));
}

#[test]
fn test_version() {
    let env = Env::new();
    let out = env.run(&["version"]);
    assert_eq!(out["version"], json!(env!("CARGO_PKG_VERSION")));
}
