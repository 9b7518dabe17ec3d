// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `pulse watch` failure modes that need no server.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::common::*;

#[test]
fn watch_without_endpoint_fails() {
    let temp = temp();
    pulse_in(temp.path())
        .arg("watch")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error: no endpoint configured"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn watch_gives_up_on_unreachable_endpoint() {
    let temp = temp();
    std::fs::write(
        temp.path().join("pulse.toml"),
        "[connection]\nbase_delay_ms = 10\nmax_attempts = 2\n",
    )
    .unwrap();

    pulse_in(temp.path())
        .args(["watch", "--endpoint", "ws://127.0.0.1:1/ws", "--json"])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"topic\":\"gave_up\""))
        .stderr(predicate::str::contains("gave up on ws://127.0.0.1:1/ws after 2 reconnect attempts"));
}
