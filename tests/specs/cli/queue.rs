// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `pulse queue` against a persisted queue file.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::common::*;

#[test]
fn list_without_queue_file() {
    let temp = temp();
    pulse_in(temp.path())
        .args(["queue", "list"])
        .assert()
        .success()
        .stdout("No pending operations.\n");
}

#[test]
fn list_shows_operations_in_order() {
    let temp = temp();
    write_queue(temp.path(), &[("items", 0), ("orders", 5)]);

    let output = pulse_in(temp.path()).args(["queue", "list"]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "{stdout}");
    assert!(lines[0].contains("POST items"));
    assert!(lines[1].contains("POST orders"));
    assert!(lines[1].contains("failures=5"));
    assert!(lines[1].contains("needs attention"));
}

#[test]
fn list_json() {
    let temp = temp();
    write_queue(temp.path(), &[("items", 1)]);

    let output = pulse_in(temp.path()).args(["queue", "list", "--json"]).output().unwrap();
    assert!(output.status.success());

    let ops: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(ops.as_array().unwrap().len(), 1);
    assert_eq!(ops[0]["operation"]["resource"], "items");
    assert_eq!(ops[0]["failures"], 1);
}

#[test]
fn clear_removes_queue_file() {
    let temp = temp();
    write_queue(temp.path(), &[("items", 0)]);

    pulse_in(temp.path())
        .args(["queue", "clear"])
        .assert()
        .success()
        .stdout("Cleared 1 pending operation.\n");

    assert!(!temp.path().join("state/pending_ops.json").exists());
    pulse_in(temp.path())
        .args(["queue", "list"])
        .assert()
        .success()
        .stdout("No pending operations.\n");
}

#[test]
fn corrupt_queue_file_is_an_error() {
    let temp = temp();
    std::fs::create_dir_all(temp.path().join("state")).unwrap();
    std::fs::write(temp.path().join("state/pending_ops.json"), "{not json").unwrap();

    pulse_in(temp.path())
        .args(["queue", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("error: queue store error"));
}

#[test]
fn queue_path_from_config() {
    let temp = temp();
    let custom = temp.path().join("custom.json");
    std::fs::write(
        temp.path().join("pulse.toml"),
        format!("[offline]\nqueue_path = {:?}\n", custom.display().to_string()),
    )
    .unwrap();
    write_queue(temp.path(), &[("ignored", 0)]);

    pulse_in(temp.path())
        .args(["queue", "list"])
        .assert()
        .success()
        .stdout("No pending operations.\n");
}
