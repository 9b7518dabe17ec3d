// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::data::DataError;
use crate::offline::StoreError;

/// All possible errors that can occur in the pulse_sync library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("cannot render config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("no endpoint configured\n  hint: pass --endpoint, set PULSE_ENDPOINT, or add [connection] endpoint to pulse.toml")]
    MissingEndpoint,

    #[error("gave up on {endpoint} after {attempts} reconnect attempts")]
    GaveUp { endpoint: String, attempts: u32 },

    #[error("offline queue is full ({limit} pending operations)\n  hint: run 'pulse queue list' to inspect, or raise [offline] max_pending")]
    QueueFull { limit: usize },

    #[error("queue store error: {0}")]
    Store(#[from] StoreError),

    #[error("request failed: {0}")]
    Data(#[from] DataError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] pulse_core::Error),
}

/// A specialized Result type for pulse_sync operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
