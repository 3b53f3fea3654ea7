//! CLI Integration Tests
//!
//! Tests the command-line interface end-to-end.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the binary to test, with state kept in `dir`.
fn planwise(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("planwise").unwrap();
    cmd.current_dir(dir)
        .env("PLANWISE_STATE_FILE", dir.join("state.json"))
        .env_remove("PLANWISE_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Help & Version Tests
// ============================================================================

#[test]
fn test_help_flag() {
    let dir = TempDir::new().unwrap();
    planwise(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("task plan"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    planwise(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_generate_requires_description() {
    let dir = TempDir::new().unwrap();
    planwise(dir.path())
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--description"));
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    planwise(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("planwise"));
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_shows_defaults() {
    let dir = TempDir::new().unwrap();
    planwise(dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[api]"))
        .stdout(predicate::str::contains("timeout_secs = 120"))
        .stdout(predicate::str::contains("Firebase"));
}

#[test]
fn test_config_local_file_and_overrides() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".planwise.toml"),
        "[api]\nbase_url = \"http://from-file:9000\"\n\n[wizard]\nintegrations = [\"Convex\"]\n",
    )
    .unwrap();

    planwise(dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://from-file:9000"))
        .stdout(predicate::str::contains("Convex"));

    planwise(dir.path())
        .env("PLANWISE_API_URL", "http://from-env:9001")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://from-env:9001"));

    planwise(dir.path())
        .env("PLANWISE_API_URL", "http://from-env:9001")
        .args(["--api-url", "http://from-flag:9002", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://from-flag:9002"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".planwise.toml"), "[api\n").unwrap();

    planwise(dir.path())
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config"));
}

// ============================================================================
// Saved State Tests
// ============================================================================

#[test]
fn test_show_and_tasks_on_fresh_state() {
    let dir = TempDir::new().unwrap();

    planwise(dir.path())
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Description:"))
        .stdout(predicate::str::contains("(none)"));

    planwise(dir.path())
        .args(["tasks", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_reset_writes_empty_state() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("state.json");
    std::fs::write(
        &state,
        r#"{"version":1,"userInput":{"description":"Old idea"},"tasks":[{"id":"T-1","title":"x","order":0}]}"#,
    )
    .unwrap();

    planwise(dir.path())
        .args(["show", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Old idea"));

    planwise(dir.path())
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared saved progress"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&state).unwrap()).unwrap();
    assert_eq!(saved["version"], 1);
    assert_eq!(saved["userInput"]["description"], "");
    assert_eq!(saved["tasks"], serde_json::json!([]));
}

// ============================================================================
// Generate Tests
// ============================================================================

#[test]
fn test_generate_against_backend() {
    let mut server = mockito::Server::new();
    let extract = server
        .mock("POST", "/process-document")
        .with_status(200)
        .with_body(r#"{"text":"Must support WebRTC"}"#)
        .create();
    let generate = server
        .mock("POST", "/generate-tasks")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "description": "Voice assistant",
            "requirements": "Must support WebRTC",
            "integrations": ["Stripe"],
        })))
        .with_status(200)
        .with_body(
            r#"{"tasks":[
                {"id":"OMN-2","title":"Build UI","status":"pending","order":2},
                {"id":"OMN-1","title":"Set up auth","status":"pending","order":1}
            ]}"#,
        )
        .create();

    let url = server.url();
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("spec.txt"), "requirements").unwrap();

    planwise(dir.path())
        .args(["--api-url", url.as_str(), "generate", "-d", "Voice assistant"])
        .args(["-r", "spec.txt", "-I", "Stripe", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?s)OMN-1.*OMN-2").unwrap());

    extract.assert();
    generate.assert();

    planwise(dir.path())
        .arg("tasks")
        .assert()
        .success()
        .stdout(predicate::str::contains("TO DO (2)"))
        .stdout(predicate::str::contains("Set up auth"));
}

#[test]
fn test_generate_reports_backend_error() {
    let mut server = mockito::Server::new();
    server.mock("POST", "/generate-tasks").with_status(500).with_body("bad input").create();
    let url = server.url();

    let dir = TempDir::new().unwrap();
    planwise(dir.path())
        .args(["--api-url", url.as_str(), "generate", "-d", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad input"));
}

#[test]
fn test_generate_rejects_wrong_file_type() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("spec.exe"), "x").unwrap();

    planwise(dir.path())
        .args(["--api-url", "http://127.0.0.1:9", "generate", "-d", "x", "-r", "spec.exe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(".exe"));
}

#[test]
fn test_generate_rejects_oversized_file() {
    let dir = TempDir::new().unwrap();
    let file = std::fs::File::create(dir.path().join("big.txt")).unwrap();
    file.set_len(6 * 1024 * 1024).unwrap();

    planwise(dir.path())
        .args(["--api-url", "http://127.0.0.1:9", "generate", "-d", "x", "-r", "big.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("larger than the 5242880 byte limit"));
}
