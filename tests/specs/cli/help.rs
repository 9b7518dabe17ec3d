// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help and usage output.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::common::*;
use yare::parameterized;

#[test]
fn help_lists_commands() {
    let temp = temp();
    pulse_in(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("queue"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("--verbose"));
}

#[test]
fn no_arguments_shows_usage_and_fails() {
    let temp = temp();
    pulse_in(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_prints_version() {
    let temp = temp();
    pulse_in(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[parameterized(
    watch = { &["watch", "--help"], "--endpoint" },
    watch_json = { &["watch", "--help"], "--json" },
    queue = { &["queue", "--help"], "list" },
    queue_list = { &["queue", "list", "--help"], "--json" },
    config = { &["config", "--help"], "TOML" },
)]
fn subcommand_help(args: &[&str], expected: &str) {
    let temp = temp();
    pulse_in(temp.path())
        .args(args)
        .assert()
        .success()
        .stdout(predicate::str::contains(expected));
}

#[test]
fn unknown_command_fails() {
    let temp = temp();
    pulse_in(temp.path())
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}
