// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use crate::config::Config;
use crate::display::format_op_line;
use crate::error::Result;
use crate::offline::{JsonFileStore, QueueStore};

/// Lists pending operations, oldest first.
pub fn list(config: &Config, json: bool) -> Result<()> {
    let store = JsonFileStore::new(config.queue_path());
    list_impl(&store, config.offline.attention_threshold, json, &mut std::io::stdout().lock())
}

/// Removes every pending operation.
pub fn clear(config: &Config) -> Result<()> {
    let store = JsonFileStore::new(config.queue_path());
    clear_impl(&store, &mut std::io::stdout().lock())
}

pub(crate) fn list_impl(
    store: &dyn QueueStore,
    attention_threshold: u32,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let ops = store.load()?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&ops)?)?;
        return Ok(());
    }
    if ops.is_empty() {
        writeln!(out, "No pending operations.")?;
        return Ok(());
    }
    for op in &ops {
        writeln!(out, "{}", format_op_line(op, attention_threshold))?;
    }
    Ok(())
}

pub(crate) fn clear_impl(store: &dyn QueueStore, out: &mut impl Write) -> Result<()> {
    let count = store.load()?.len();
    store.clear()?;
    let noun = if count == 1 { "operation" } else { "operations" };
    writeln!(out, "Cleared {count} pending {noun}.")?;
    Ok(())
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
