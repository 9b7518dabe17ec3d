// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostic logging setup.

use std::fs;
use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::env;

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Installs the global subscriber.
///
/// Logs go to `PULSE_LOG_FILE` when set and writable, stderr otherwise.
/// Calling this more than once is harmless.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    if let Some(file) = env::log_file().and_then(|path| open_log(&path)) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

fn open_log(path: &Path) -> Option<fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).ok()?;
    }
    fs::OpenOptions::new().create(true).append(true).open(path).ok()
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
