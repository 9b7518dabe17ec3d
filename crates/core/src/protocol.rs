// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket envelopes exchanged with the push backend.
//!
//! The protocol is small:
//! - Server pushes `{type, data, timestamp}` envelopes naming a domain event
//! - Client sends `{type, payload, timestamp}` envelopes, `ping` being the only
//!   one sent without a caller asking for it

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Heartbeat message type sent by the client.
pub const PING: &str = "ping";

/// Heartbeat reply some servers send back; ignored on receipt.
pub const PONG: &str = "pong";

/// Envelope pushed from the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InboundEnvelope {
    /// Event name, e.g. `item_created`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Event payload. Missing data decodes as `null`.
    #[serde(default)]
    pub data: Value,

    /// Server timestamp in milliseconds since Unix epoch, when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

/// Envelope sent from the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboundEnvelope {
    /// Message name.
    #[serde(rename = "type")]
    pub kind: String,

    /// Message payload.
    #[serde(default)]
    pub payload: Value,

    /// Client timestamp in milliseconds since Unix epoch.
    pub timestamp: u64,
}

impl InboundEnvelope {
    /// Creates an inbound envelope.
    pub fn new(kind: impl Into<String>, data: Value, timestamp: Option<u64>) -> Self {
        InboundEnvelope { kind: kind.into(), data, timestamp }
    }

    /// Serializes the envelope to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the envelope from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl OutboundEnvelope {
    /// Creates an outbound envelope.
    pub fn new(kind: impl Into<String>, payload: Value, timestamp: u64) -> Self {
        OutboundEnvelope { kind: kind.into(), payload, timestamp }
    }

    /// Creates a heartbeat envelope with no payload.
    pub fn ping(timestamp: u64) -> Self {
        OutboundEnvelope::new(PING, Value::Null, timestamp)
    }

    /// Returns true for heartbeat envelopes.
    pub fn is_ping(&self) -> bool {
        self.kind == PING
    }

    /// Serializes the envelope to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the envelope from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
