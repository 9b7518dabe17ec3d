// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for pulse-core operations.

use thiserror::Error;

/// All possible errors that can occur in pulse-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown topic: '{0}'\n  hint: valid topics are: {names}", names = crate::event::Topic::names().join(", "))]
    UnknownTopic(String),

    #[error("unknown method: '{0}'\n  hint: valid methods are: GET, POST, PUT, PATCH, DELETE")]
    UnknownMethod(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for pulse-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
