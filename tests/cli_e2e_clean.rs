//! End-to-end tests for the `clean` and `reset` commands
//!
//! These tests invoke the actual CLI binary and validate its behavior
//! from a user's perspective.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Test that clean removes an orphaned managed file
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_clean_removes_orphan() {
    let temp = assert_fs::TempDir::new().unwrap();
    let orphan = temp.child("b.copy.txt");
    orphan.write_str("orphan").unwrap();
    let unmanaged = temp.child("notes.txt");
    unmanaged.write_str("keep").unwrap();

    let mut cmd = cargo_bin_cmd!("remote-sync");

    cmd.arg("clean")
        .arg("--root")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 orphaned file(s)"));

    orphan.assert(predicate::path::missing());
    unmanaged.assert(predicate::path::exists());
}

/// Test that clean reports when there is nothing to do
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_clean_no_orphans() {
    let temp = assert_fs::TempDir::new().unwrap();

    let mut cmd = cargo_bin_cmd!("remote-sync");

    cmd.arg("clean")
        .arg("--root")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No orphaned files found"));
}

/// Test that reset writes an empty state document
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_reset_writes_state_document() {
    let temp = assert_fs::TempDir::new().unwrap();

    let mut cmd = cargo_bin_cmd!("remote-sync");

    cmd.arg("reset")
        .arg("--root")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("State reset"));

    temp.child(".lock-file").assert(predicate::path::exists());
    temp.child(".lock-file")
        .assert(predicate::str::contains("\"schema_version\": \"1.0.0\""));
}

/// Test that validate succeeds against a freshly reset state
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_validate_after_reset() {
    let temp = assert_fs::TempDir::new().unwrap();

    let mut cmd = cargo_bin_cmd!("remote-sync");
    cmd.arg("reset").arg("--root").arg(temp.path()).assert().success();

    let mut cmd = cargo_bin_cmd!("remote-sync");
    cmd.arg("validate")
        .arg("--root")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("State valid"));
}
