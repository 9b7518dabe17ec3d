// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Push channel to the backend.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ ConnectionManager │────►│  Transport  │────►│   Backend   │
//! │   (session task)  │◄────│   (trait)   │◄────│  WebSocket  │
//! └───────────────────┘     └─────────────┘     └─────────────┘
//!          │
//!          ▼
//!     EventSink (the broker)
//! ```
//!
//! # Features
//!
//! - Reconnect with exponential backoff and a terminal `gave_up` event
//! - Outbound FIFO buffered while disconnected, flushed on connect
//! - Heartbeat `ping` while connected
//! - Injectable connector for testing

mod manager;
mod transport;

pub use manager::{
    reconnect_delay, ConnectionConfig, ConnectionManager, ConnectionState, EventSink,
};
pub use transport::{
    Connector, Transport, TransportError, TransportFuture, TransportResult, WebSocketConnector,
    WebSocketTransport,
};
