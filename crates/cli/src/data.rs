// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The request capability consumed from the host application.
//!
//! Both the fetcher and the offline queue issue requests through
//! [`DataAccess`]. Implementations must honor the cancellation token so a
//! superseded fetch stops doing work, not just stops being awaited.

use std::future::Future;
use std::pin::Pin;

use pulse_core::OpDescriptor;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// A request to the data-access layer. Same shape as a replayable op.
pub type Request = OpDescriptor;

/// Boxed future returned by [`DataAccess::request`].
pub type DataFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, DataError>> + Send + 'a>>;

/// Error type for data-access requests.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    /// The backend could not be reached.
    #[error("network unavailable: {0}")]
    Network(String),

    /// The backend answered with a failure status.
    #[error("server returned {code}: {message}")]
    Status { code: u16, message: String },

    /// The request was cancelled before completing.
    #[error("request cancelled")]
    Cancelled,

    /// The response could not be interpreted.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl DataError {
    /// Returns true when the failure means "offline" rather than "rejected".
    pub fn is_connectivity(&self) -> bool {
        matches!(self, DataError::Network(_))
    }
}

/// Issues requests against the backend.
pub trait DataAccess: Send + Sync {
    fn request(&self, request: Request, cancel: CancellationToken) -> DataFuture<'_>;
}
