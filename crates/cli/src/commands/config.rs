// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use crate::config::Config;
use crate::error::Result;

/// Prints the effective configuration.
pub fn run(config: &Config) -> Result<()> {
    run_impl(config, &mut std::io::stdout().lock())
}

pub(crate) fn run_impl(config: &Config, out: &mut impl Write) -> Result<()> {
    write!(out, "{}", config.to_toml()?)?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
