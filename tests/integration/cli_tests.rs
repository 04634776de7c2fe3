//! CLI integration tests
//!
//! These tests verify that the CLI works correctly with various options.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn apiuse() -> Command {
    let mut cmd = Command::cargo_bin("apiuse").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

fn product() -> String {
    fixtures_path().join("product.json").to_string_lossy().to_string()
}

fn read_report(path: &std::path::Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_cli_help() {
    apiuse()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("apiuse"))
        .stdout(predicate::str::contains("--report"))
        .stdout(predicate::str::contains("--internal"))
        .stdout(predicate::str::contains("--archive-patterns"));
}

#[test]
fn test_cli_version() {
    apiuse()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("apiuse"));
}

// ============================================================================
// Fatal configuration errors
// ============================================================================

#[test]
fn test_missing_report_location() {
    let temp_dir = TempDir::new().unwrap();
    apiuse()
        .current_dir(temp_dir.path())
        .args([product().as_str(), "--api"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No report location given"));
}

#[test]
fn test_missing_baseline_location() {
    let temp_dir = TempDir::new().unwrap();
    apiuse()
        .current_dir(temp_dir.path())
        .args(["--report", "report.json", "--api"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No baseline location given"));
}

#[test]
fn test_nothing_to_search() {
    let temp_dir = TempDir::new().unwrap();
    apiuse()
        .current_dir(temp_dir.path())
        .args([product().as_str(), "--report", "report.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Neither API nor internal"));
}

#[test]
fn test_invalid_scope_pattern() {
    let temp_dir = TempDir::new().unwrap();
    apiuse()
        .current_dir(temp_dir.path())
        .args([product().as_str(), "--report", "report.json", "--api"])
        .args(["--scope-pattern", "org.(broken"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid pattern"));
}

#[test]
fn test_unreadable_baseline() {
    let temp_dir = TempDir::new().unwrap();
    apiuse()
        .current_dir(temp_dir.path())
        .args(["missing.json", "--report", "report.json", "--api"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load baseline"));
}

// ============================================================================
// Searching
// ============================================================================

#[test]
fn test_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("report.json");

    let output = apiuse()
        .current_dir(temp_dir.path())
        .args([product().as_str(), "--report"])
        .arg(&report)
        .args(["--api", "--internal", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stdout["total_references"], 4);
    assert_eq!(read_report(&report), stdout);
}

#[test]
fn test_terminal_output() {
    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("report.json");

    apiuse()
        .current_dir(temp_dir.path())
        .args([product().as_str(), "--internal", "--report"])
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 references:"))
        .stdout(predicate::str::contains("org.example.core (api: 0, internal: 2, unannotated: 0)"))
        .stdout(predicate::str::contains("Skipped 1 components:"))
        .stdout(predicate::str::contains("Missing required bundle org.example.missing"));

    assert!(report.exists());
}

#[test]
fn test_comma_separated_archive_patterns() {
    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("report.json");

    apiuse()
        .current_dir(temp_dir.path())
        .args([product().as_str(), "--internal", "-q", "--report"])
        .arg(&report)
        .args(["--archive-patterns", "org.example.app:legacy.jar, malformed"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(read_report(&report)["total_references"], 1);
}

#[test]
fn test_config_file_with_cli_override() {
    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("report.json");

    apiuse()
        .current_dir(temp_dir.path())
        .arg(product())
        .arg("--config")
        .arg(fixtures_path().join("apiuse.yml"))
        .args(["-q", "--report"])
        .arg(&report)
        .args(["--reference-pattern", "org\\.example\\.util"])
        .assert()
        .success();

    let value = read_report(&report);
    assert_eq!(value["total_references"], 1);
    assert_eq!(value["references"][0]["target_component"], "org.example.util");
}

#[test]
fn test_parallel_matches_sequential() {
    let temp_dir = TempDir::new().unwrap();
    let sequential = temp_dir.path().join("sequential.json");
    let parallel = temp_dir.path().join("parallel.json");

    for (report, extra) in [(&sequential, None), (&parallel, Some("--parallel"))] {
        let mut cmd = apiuse();
        cmd.current_dir(temp_dir.path())
            .args([product().as_str(), "--api", "--internal", "-q", "--report"])
            .arg(report);
        if let Some(flag) = extra {
            cmd.arg(flag);
        }
        cmd.assert().success();
    }

    assert_eq!(read_report(&sequential), read_report(&parallel));
}

#[test]
fn test_default_config_location() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join(".apiuse.toml"),
        format!(
            "baseline = {:?}\nreport = \"out/report.json\"\ninclude_api = true\n",
            product()
        ),
    )
    .unwrap();

    apiuse().current_dir(temp_dir.path()).arg("-q").assert().success();

    let value = read_report(&temp_dir.path().join("out").join("report.json"));
    assert_eq!(value["total_references"], 1);
}
