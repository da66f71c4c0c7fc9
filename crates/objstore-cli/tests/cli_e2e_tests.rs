//! End-to-end tests driving the compiled `objstore` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn objstore(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("objstore").unwrap();
    cmd.arg("--dir").arg(dir);
    cmd
}

#[test]
fn put_then_get_round_trips_fields() {
    let dir = tempdir().unwrap();

    let output = objstore(dir.path())
        .args(["put", "User", "name=Ada", "age=36"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let uuid = stdout.split_whitespace().last().unwrap().to_string();

    objstore(dir.path())
        .args(["get", &uuid])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada"));
}

#[test]
fn get_of_missing_uuid_exits_one() {
    let dir = tempdir().unwrap();
    objstore(dir.path())
        .args(["get", "00000000-0000-4000-8000-000000000000"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn get_of_malformed_uuid_exits_one() {
    let dir = tempdir().unwrap();
    objstore(dir.path())
        .args(["get", "not-a-uuid"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn delete_then_list_shows_nothing() {
    let dir = tempdir().unwrap();
    let output = objstore(dir.path())
        .args(["put", "User", "name=Grace"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let uuid = stdout.split_whitespace().last().unwrap().to_string();

    objstore(dir.path())
        .args(["delete", &uuid])
        .assert()
        .success();

    objstore(dir.path())
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no objects found"));
}

#[test]
fn safemode_on_blocks_put_with_exit_code_two() {
    let dir = tempdir().unwrap();
    objstore(dir.path()).args(["safemode", "on"]).assert().success();

    objstore(dir.path())
        .args(["put", "User", "name=Ada"])
        .assert()
        .failure()
        .code(2);

    objstore(dir.path())
        .args(["safemode", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("on"));
}

#[test]
fn json_flag_emits_parseable_json_on_stats() {
    let dir = tempdir().unwrap();
    objstore(dir.path())
        .args(["put", "User", "name=Ada"])
        .assert()
        .success();

    let output = objstore(dir.path())
        .args(["--json", "stats"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["object_count"], 1);
}

#[test]
fn lifetime_set_then_get_reports_remaining_ttl() {
    let dir = tempdir().unwrap();
    let output = objstore(dir.path())
        .args(["put", "User", "name=Ada"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let uuid = stdout.split_whitespace().last().unwrap().to_string();

    objstore(dir.path())
        .args(["lifetime", "set", &uuid, "3600"])
        .assert()
        .success();

    objstore(dir.path())
        .args(["lifetime", "get", &uuid])
        .assert()
        .success()
        .stdout(predicate::str::contains("remaining"));
}

#[test]
fn check_on_clean_store_reports_no_issues() {
    let dir = tempdir().unwrap();
    objstore(dir.path())
        .args(["put", "User", "name=Ada"])
        .assert()
        .success();

    objstore(dir.path())
        .args(["check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no issues found"));
}
