// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables read by the library and tool are
//! defined here with typed accessor functions. The variable name constants
//! are generated by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Returns the value of `PULSE_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    non_empty(vars::PULSE_CONFIG).map(PathBuf::from)
}

/// Returns the value of `PULSE_ENDPOINT` if set.
pub fn endpoint() -> Option<String> {
    non_empty(vars::PULSE_ENDPOINT)
}

/// Returns the value of `PULSE_TOKEN` if set.
pub fn token() -> Option<String> {
    non_empty(vars::PULSE_TOKEN)
}

/// Returns the value of `PULSE_STATE_DIR` if set.
pub fn state_dir() -> Option<PathBuf> {
    non_empty(vars::PULSE_STATE_DIR).map(PathBuf::from)
}

/// Returns the value of `PULSE_LOG_FILE` if set.
pub fn log_file() -> Option<PathBuf> {
    non_empty(vars::PULSE_LOG_FILE).map(PathBuf::from)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
