// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed local events and the topics they are published under.
//!
//! Server pushes map 1:1 onto the domain topics. The connection lifecycle
//! publishes its own status topics so subscribers can tell a transient drop
//! (`disconnect`) from the terminal `gave_up` signal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::protocol::InboundEnvelope;

/// A named category of local event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    ItemUpdated,
    ItemCreated,
    ItemDeleted,
    InventoryUpdated,
    TransactionCreated,
    Connect,
    Disconnect,
    ConnectError,
    Reconnecting,
    GaveUp,
    Error,
}

impl Topic {
    /// Topics that originate from server pushes.
    pub const SERVER: [Topic; 5] = [
        Topic::ItemUpdated,
        Topic::ItemCreated,
        Topic::ItemDeleted,
        Topic::InventoryUpdated,
        Topic::TransactionCreated,
    ];

    /// Topics published by the connection lifecycle.
    pub const STATUS: [Topic; 6] = [
        Topic::Connect,
        Topic::Disconnect,
        Topic::ConnectError,
        Topic::Reconnecting,
        Topic::GaveUp,
        Topic::Error,
    ];

    /// Returns the wire/topic name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::ItemUpdated => "item_updated",
            Topic::ItemCreated => "item_created",
            Topic::ItemDeleted => "item_deleted",
            Topic::InventoryUpdated => "inventory_updated",
            Topic::TransactionCreated => "transaction_created",
            Topic::Connect => "connect",
            Topic::Disconnect => "disconnect",
            Topic::ConnectError => "connect_error",
            Topic::Reconnecting => "reconnecting",
            Topic::GaveUp => "gave_up",
            Topic::Error => "error",
        }
    }

    /// Returns every topic name, server topics first.
    pub fn names() -> Vec<&'static str> {
        Topic::SERVER.iter().chain(Topic::STATUS.iter()).map(Topic::as_str).collect()
    }

    /// Returns true for topics carried by server pushes.
    pub fn is_server(&self) -> bool {
        Topic::SERVER.contains(self)
    }

    /// Maps an inbound message type onto its server topic.
    ///
    /// Lifecycle names are not accepted from the wire.
    pub fn from_wire(kind: &str) -> Option<Topic> {
        Topic::SERVER.into_iter().find(|t| t.as_str() == kind)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Topic::SERVER
            .into_iter()
            .chain(Topic::STATUS)
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnknownTopic(s.to_string()))
    }
}

/// A local event, one variant per topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topic", content = "data", rename_all = "snake_case")]
pub enum Event {
    ItemUpdated(Value),
    ItemCreated(Value),
    ItemDeleted(Value),
    InventoryUpdated(Value),
    TransactionCreated(Value),

    /// The channel is open.
    #[serde(rename = "connect")]
    Connected,

    /// The channel closed, either unplanned or by `disconnect`.
    #[serde(rename = "disconnect")]
    Disconnected { reason: String },

    /// A connection attempt failed. `attempt` is 0 for the first try.
    ConnectError { attempt: u32, message: String },

    /// A reconnect has been scheduled `delay_ms` from now.
    Reconnecting { attempt: u32, delay_ms: u64 },

    /// Reconnection was exhausted; nothing further is scheduled.
    GaveUp { attempts: u32 },

    /// A transport error during an open session.
    Error { message: String },
}

impl Event {
    /// Builds the event for a server topic.
    ///
    /// Returns `None` for lifecycle topics, which carry no free-form payload.
    pub fn server(topic: Topic, data: Value) -> Option<Event> {
        let event = match topic {
            Topic::ItemUpdated => Event::ItemUpdated(data),
            Topic::ItemCreated => Event::ItemCreated(data),
            Topic::ItemDeleted => Event::ItemDeleted(data),
            Topic::InventoryUpdated => Event::InventoryUpdated(data),
            Topic::TransactionCreated => Event::TransactionCreated(data),
            _ => return None,
        };
        Some(event)
    }

    /// Translates an inbound envelope, or `None` for unrecognized types.
    pub fn from_envelope(envelope: &InboundEnvelope) -> Option<Event> {
        Topic::from_wire(&envelope.kind).and_then(|t| Event::server(t, envelope.data.clone()))
    }

    /// Returns the topic this event is published under.
    pub fn topic(&self) -> Topic {
        match self {
            Event::ItemUpdated(_) => Topic::ItemUpdated,
            Event::ItemCreated(_) => Topic::ItemCreated,
            Event::ItemDeleted(_) => Topic::ItemDeleted,
            Event::InventoryUpdated(_) => Topic::InventoryUpdated,
            Event::TransactionCreated(_) => Topic::TransactionCreated,
            Event::Connected => Topic::Connect,
            Event::Disconnected { .. } => Topic::Disconnect,
            Event::ConnectError { .. } => Topic::ConnectError,
            Event::Reconnecting { .. } => Topic::Reconnecting,
            Event::GaveUp { .. } => Topic::GaveUp,
            Event::Error { .. } => Topic::Error,
        }
    }

    /// Returns the server payload, if this is a server event.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Event::ItemUpdated(v)
            | Event::ItemCreated(v)
            | Event::ItemDeleted(v)
            | Event::InventoryUpdated(v)
            | Event::TransactionCreated(v) => Some(v),
            _ => None,
        }
    }

    /// Returns true for the terminal reconnection signal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::GaveUp { .. })
    }

    /// Collects every free-text fragment carried by the event.
    ///
    /// Payload strings are gathered recursively; lifecycle events contribute
    /// their reason or message.
    pub fn text_fragments(&self) -> Vec<&str> {
        let mut out = Vec::new();
        match self {
            Event::Disconnected { reason } => out.push(reason.as_str()),
            Event::ConnectError { message, .. } | Event::Error { message } => {
                out.push(message.as_str())
            }
            _ => {}
        }
        if let Some(payload) = self.payload() {
            collect_strings(payload, &mut out);
        }
        out
    }
}

fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}

/// Returns the identifier of a record payload as a string key.
///
/// Numeric and string ids compare equal when they print the same, so
/// `{"id": 7}` and `{"id": "7"}` name the same record.
pub fn record_key(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
