// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pulse_sync - real-time event sync with offline-resilient mutations.
//!
//! This crate keeps a client in step with a backend that pushes events
//! over a WebSocket, and keeps user mutations safe while the backend is
//! unreachable.
//!
//! # Main Components
//!
//! - [`connection::ConnectionManager`] - one push channel with reconnect, heartbeat and an outbound buffer
//! - [`broker::Broker`] - topic fan-out for one endpoint, one per endpoint via [`broker::BrokerRegistry`]
//! - [`fetch::CoordinatedFetcher`] - latest-wins list fetching kept current by server events
//! - [`offline::OfflineQueue`] - persisted mutations replayed in order once back online
//! - [`notify::NotificationCenter`] - notification history, critical alerts and transient displays
//! - [`SyncContext`] - owns all of the above for an application
//!
//! # Usage
//!
//! ```rust,ignore
//! use pulse_sync::{Config, SyncContext};
//!
//! let config = Config::load(None)?;
//! let ctx = SyncContext::new(config, connector, data, chime)?;
//! let _sub = ctx.subscribe(Topic::ItemCreated, |event| println!("{event:?}"))?;
//! // ...
//! ctx.shutdown().await;
//! ```

mod cli;
mod commands;
mod display;

pub mod broker;
pub mod config;
pub mod connection;
pub mod context;
pub mod data;
pub mod env;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod notify;
pub mod offline;
pub mod timer;

#[cfg(test)]
mod test_support;

pub use cli::{Cli, Command, QueueCommand};
pub use config::Config;
pub use context::SyncContext;
pub use error::{Error, Result};

/// Execute a CLI invocation. This is the main entry point for the binary
/// and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    match cli.command {
        Command::Watch { endpoint, token, json } => {
            commands::watch::run(config, endpoint, token, json)
        }
        Command::Queue(QueueCommand::List { json }) => commands::queue::list(&config, json),
        Command::Queue(QueueCommand::Clear) => commands::queue::clear(&config),
        Command::Config => commands::config::run(&config),
    }
}
