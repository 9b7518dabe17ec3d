// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test files,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

const PULSE_VARS: [&str; 5] =
    ["PULSE_CONFIG", "PULSE_ENDPOINT", "PULSE_TOKEN", "PULSE_STATE_DIR", "PULSE_LOG_FILE"];

/// `pulse` running in `dir`, with state kept under `dir/state` and no
/// inherited `PULSE_*` settings.
pub fn pulse_in(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("pulse");
    for var in PULSE_VARS {
        cmd.env_remove(var);
    }
    cmd.env("PULSE_STATE_DIR", dir.join("state")).current_dir(dir);
    cmd
}

/// A temp directory to run `pulse` in.
pub fn temp() -> TempDir {
    TempDir::new().unwrap()
}

/// Writes a persisted queue with one operation per `(resource, failures)`.
pub fn write_queue(dir: &Path, ops: &[(&str, u32)]) {
    let ops: Vec<serde_json::Value> = ops
        .iter()
        .enumerate()
        .map(|(i, (resource, failures))| {
            serde_json::json!({
                "id": format!("op-{i:012x}"),
                "timestamp": 1_700_000_000_000u64 + i as u64,
                "failures": failures,
                "operation": {"method": "POST", "resource": resource, "params": {"qty": 1}},
            })
        })
        .collect();
    let state = dir.join("state");
    std::fs::create_dir_all(&state).unwrap();
    std::fs::write(state.join("pending_ops.json"), serde_json::to_string_pretty(&ops).unwrap())
        .unwrap();
}
