// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

#[derive(Parser, Debug)]
#[command(name = "pulse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Real-time event sync with offline-resilient mutations")]
#[command(
    long_about = "Real-time event sync with offline-resilient mutations.\n\n\
    Watches a backend's WebSocket push channel, records notifications for the events it\n\
    receives, and manages operations queued while the backend was unreachable."
)]
pub struct Cli {
    /// Log debug output to stderr (or PULSE_LOG_FILE)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read configuration from <path> instead of PULSE_CONFIG or ./pulse.toml
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to the backend and print events as they arrive
    #[command(after_help = "\
Examples:
  pulse watch --endpoint ws://localhost:8000/ws    Watch a local backend
  pulse watch --json                              Print one JSON object per event
  PULSE_TOKEN=abc pulse watch                     Authenticate with a bearer token")]
    Watch {
        /// WebSocket URL (overrides config and PULSE_ENDPOINT)
        #[arg(long, value_parser = non_empty_string)]
        endpoint: Option<String>,

        /// Bearer token (overrides config and PULSE_TOKEN)
        #[arg(long, value_parser = non_empty_string)]
        token: Option<String>,

        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Inspect or reset the offline mutation queue
    #[command(subcommand)]
    Queue(QueueCommand),

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Subcommand, Debug)]
pub enum QueueCommand {
    /// List pending operations, oldest first
    List {
        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Remove every pending operation
    Clear,
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
