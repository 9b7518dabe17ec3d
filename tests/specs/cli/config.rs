// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `pulse config` and configuration discovery.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::common::*;
use yare::parameterized;

#[test]
fn defaults_without_config_file() {
    let temp = temp();
    pulse_in(temp.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[connection]"))
        .stdout(predicate::str::contains("base_delay_ms = 1000"))
        .stdout(predicate::str::contains("max_attempts = 5"))
        .stdout(predicate::str::contains("debounce_ms = 300"))
        .stdout(predicate::str::contains("history_limit = 50"))
        .stdout(predicate::str::contains("endpoint").not());
}

#[test]
fn reads_pulse_toml_in_current_directory() {
    let temp = temp();
    std::fs::write(temp.path().join("pulse.toml"), "[connection]\nmax_attempts = 9\n").unwrap();

    pulse_in(temp.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max_attempts = 9"));
}

#[parameterized(
    flag = { true },
    env = { false },
)]
fn explicit_config_location(use_flag: bool) {
    let temp = temp();
    let path = temp.path().join("alt.toml");
    std::fs::write(&path, "[fetch]\nresource = \"inventory\"\n").unwrap();

    let mut cmd = pulse_in(temp.path());
    if use_flag {
        cmd.arg("--config").arg(&path);
    } else {
        cmd.env("PULSE_CONFIG", &path);
    }
    cmd.arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("resource = \"inventory\""));
}

#[test]
fn endpoint_from_environment() {
    let temp = temp();
    pulse_in(temp.path())
        .env("PULSE_ENDPOINT", "wss://env.example.com/ws")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("endpoint = \"wss://env.example.com/ws\""));
}

#[test]
fn missing_explicit_config_fails() {
    let temp = temp();
    pulse_in(temp.path())
        .args(["--config", "nope.toml", "config"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("error: "));
}

#[test]
fn invalid_config_fails() {
    let temp = temp();
    std::fs::write(temp.path().join("pulse.toml"), "[connection\n").unwrap();

    pulse_in(temp.path())
        .arg("config")
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("error: invalid config"));
}
