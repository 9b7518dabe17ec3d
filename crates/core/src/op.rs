// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending operations for offline replay.
//!
//! A mutation made while offline is captured as an [`OpDescriptor`]: enough
//! to re-issue it through the data-access layer later. Each queued descriptor
//! is wrapped in a [`PendingOp`] carrying its identity and failure count.
//!
//! Ops are designed to be:
//!
//! - Serializable: the queue is persisted on every change
//! - Replayable: a descriptor is all a data-access layer needs to retry it

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// HTTP verb of a replayable request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Returns true for methods that change server state.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            _ => Err(Error::UnknownMethod(s.to_string())),
        }
    }
}

/// A serializable request that can be re-issued later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpDescriptor {
    pub method: Method,
    /// Resource path, e.g. `items/42`.
    pub resource: String,
    #[serde(default)]
    pub params: Value,
}

impl OpDescriptor {
    pub fn new(method: Method, resource: impl Into<String>, params: Value) -> Self {
        OpDescriptor { method, resource: resource.into(), params }
    }
}

impl fmt::Display for OpDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.resource)
    }
}

/// A queued operation awaiting replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOp {
    pub id: String,
    /// Enqueue time in milliseconds since Unix epoch.
    pub timestamp: u64,
    /// Number of replay attempts that failed.
    #[serde(default)]
    pub failures: u32,
    pub operation: OpDescriptor,
}

static OP_SEQ: AtomicU64 = AtomicU64::new(0);

impl PendingOp {
    /// Wraps a descriptor with a fresh id and zero failures.
    pub fn new(operation: OpDescriptor, timestamp: u64) -> Self {
        let seq = OP_SEQ.fetch_add(1, Ordering::Relaxed);
        PendingOp { id: generate_op_id(&operation, timestamp, seq), timestamp, failures: 0, operation }
    }

    /// Records a failed replay attempt.
    pub fn record_failure(&mut self) {
        self.failures = self.failures.saturating_add(1);
    }
}

/// Generate an op ID from the descriptor, timestamp, and a sequence number.
/// Format: op-{hash} where hash is the first 12 hex chars of SHA256.
pub fn generate_op_id(operation: &OpDescriptor, timestamp: u64, seq: u64) -> String {
    let input = format!("{}{}{}{}{}", operation.method, operation.resource, operation.params, timestamp, seq);
    let hash = Sha256::digest(input.as_bytes());
    format!("op-{}", hex::encode(&hash[..6]))
}

#[cfg(test)]
#[path = "op_tests.rs"]
mod tests;
