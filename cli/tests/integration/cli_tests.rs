//! Integration tests for the installer binary.
//!
//! Every test scrubs the `HOSTWATCH_*` environment and points the settings
//! file at a temp path, so nothing on the host is read or changed. Only
//! paths that fail before touching the host are exercised here.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CREDENTIAL_VARS: [&str; 4] = [
    "HOSTWATCH_BOOTSTRAP_TOKEN",
    "HOSTWATCH_SERVER_ID",
    "HOSTWATCH_SERVER_SECRET",
    "HOSTWATCH_BACKEND_URL",
];

/// The installer with a clean environment and settings under `dir`.
fn installer(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hostwatch-install"));
    for var in CREDENTIAL_VARS {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1")
        .env("HOSTWATCH_INSTALLER_CONFIG", dir.path().join("installer.yaml"));
    cmd
}

// --- Help and version tests ---

#[test]
fn test_help_lists_credential_flags() {
    let dir = TempDir::new().expect("temp dir");
    installer(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--token"))
        .stdout(predicate::str::contains("--server-id"))
        .stdout(predicate::str::contains("--server-secret"))
        .stdout(predicate::str::contains("--backend-url"));
}

#[test]
fn test_version_flag_shows_version() {
    let dir = TempDir::new().expect("temp dir");
    installer(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hostwatch-install"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_flag_is_usage_error() {
    let dir = TempDir::new().expect("temp dir");
    installer(&dir)
        .arg("--reinstall-everything")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unexpected argument"));
}

// --- Credential checks ---

#[test]
fn test_no_credentials_names_bootstrap_token() {
    let dir = TempDir::new().expect("temp dir");
    installer(&dir)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("bootstrap token"))
        .stderr(predicate::str::contains("HOSTWATCH_BOOTSTRAP_TOKEN"));
}

#[test]
fn test_missing_secret_is_reported_without_leaking_token() {
    let dir = TempDir::new().expect("temp dir");
    installer(&dir)
        .args(["--token", "bt-very-private", "--server-id", "srv-0042"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("server secret"))
        .stderr(predicate::str::contains("bt-very-private").not())
        .stdout(predicate::str::contains("bt-very-private").not());
}

#[test]
fn test_credentials_are_read_from_environment() {
    let dir = TempDir::new().expect("temp dir");
    installer(&dir)
        .env("HOSTWATCH_BOOTSTRAP_TOKEN", "bt-env")
        .env("HOSTWATCH_SERVER_ID", "srv-env")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("server secret"))
        .stderr(predicate::str::contains("bootstrap token").not());
}

#[test]
fn test_blank_credential_counts_as_missing() {
    let dir = TempDir::new().expect("temp dir");
    installer(&dir)
        .args(["--token", "bt", "--server-id", "   ", "--server-secret", "s"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("server ID"));
}

// --- Configuration errors ---

#[test]
fn test_invalid_backend_url_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    installer(&dir)
        .args(["--backend-url", "ftp://backend.example"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid backend URL"));
}

#[test]
fn test_malformed_settings_file_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("installer.yaml"), "settle_secs: [3\n").unwrap();
    installer(&dir)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot parse"));
}

#[test]
fn test_invalid_service_name_in_settings_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join("installer.yaml"),
        "service_name: \"agent; rm -rf /\"\n",
    )
    .unwrap();
    installer(&dir)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid service name"));
}
