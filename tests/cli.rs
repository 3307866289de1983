//! CLI integration tests for the admin commands.
//!
//! Each test works in its own temp data directory.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use assert_cmd::Command;
use assert_fs::TempDir;
use predicates::prelude::*;
use serde_json::Value;

struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn data_dir_str(&self) -> String {
        self.temp_dir.path().to_string_lossy().to_string()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("shaderhub").expect("failed to find binary");
        cmd.env("NO_COLOR", "1");
        cmd
    }

    fn create_user(&self, username: &str) -> assert_cmd::assert::Assert {
        self.cmd()
            .args([
                "admin",
                "create-user",
                "--data-dir",
                &self.data_dir_str(),
                "--username",
                username,
                "--password",
                "password123",
            ])
            .assert()
    }

    fn snapshot(&self) -> Value {
        let raw = std::fs::read_to_string(self.temp_dir.path().join("shaderhub.json"))
            .expect("snapshot file");
        serde_json::from_str(&raw).expect("failed to parse JSON")
    }
}

#[test]
fn test_help_lists_commands() {
    TestContext::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve").and(predicate::str::contains("admin")));
}

#[test]
fn test_create_user_writes_snapshot() {
    let ctx = TestContext::new();
    ctx.create_user("ada")
        .success()
        .stdout(predicate::str::contains("Created user 'ada' with id 1"));

    let snapshot = ctx.snapshot();
    assert_eq!(snapshot["users"][0]["username"], "ada");
    assert!(
        snapshot["users"][0]["password_hash"]
            .as_str()
            .unwrap()
            .starts_with("$argon2id$")
    );
    assert!(snapshot["tags"].as_array().unwrap().is_empty());
}

#[test]
fn test_create_user_rejects_duplicate() {
    let ctx = TestContext::new();
    ctx.create_user("ada").success();
    ctx.create_user("ADA")
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_create_user_rejects_bad_username() {
    let ctx = TestContext::new();
    ctx.create_user("_x").failure();
}

#[test]
fn test_serve_rejects_out_of_range_session_ttl() {
    let ctx = TestContext::new();
    ctx.cmd()
        .args([
            "serve",
            "--data-dir",
            &ctx.data_dir_str(),
            "--port",
            "0",
            "--session-ttl-hours",
            "10000000000",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("session TTL"));
}
