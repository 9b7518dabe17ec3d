// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_support::{clock, MockServer};
use pulse_core::Topic;
use std::time::Duration;
use yare::parameterized;

fn registry(server: &MockServer) -> BrokerRegistry {
    BrokerRegistry::new(ConnectionConfig::default(), server.connector(), clock(), Some("t0k".into()))
}

#[parameterized(
    plain = { "ws://host/ws", "ws://host/ws" },
    trailing = { "ws://host/ws/", "ws://host/ws" },
    many_trailing = { "ws://host/ws///", "ws://host/ws" },
    whitespace = { "  ws://host/ws ", "ws://host/ws" },
)]
fn test_normalize_endpoint(input: &str, expected: &str) {
    assert_eq!(normalize_endpoint(input), expected);
}

#[test]
fn test_one_broker_per_endpoint() {
    let server = MockServer::new();
    let registry = registry(&server);
    assert!(registry.is_empty());

    let a = registry.get("ws://host/ws");
    let b = registry.get("ws://host/ws/");
    let c = registry.get("ws://other/ws");

    assert_eq!(registry.len(), 2);
    assert_eq!(a.endpoint(), "ws://host/ws");
    assert_eq!(b.endpoint(), "ws://host/ws");
    assert_eq!(c.endpoint(), "ws://other/ws");

    let _sub = a.subscribe(Topic::ItemCreated, |_| {});
    assert_eq!(b.subscriber_count(Topic::ItemCreated), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_disconnects_and_drains() {
    let server = MockServer::new();
    let registry = registry(&server);
    let broker = registry.get("ws://host/ws");
    let _sub = broker.subscribe(Topic::ItemCreated, |_| {});
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(server.tokens(), vec![Some("t0k".to_string())]);

    registry.shutdown().await;

    assert!(!broker.connection().is_connected());
    assert_eq!(broker.total_subscribers(), 0);
    assert_eq!(registry.len(), 1);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(server.connects(), 1);
}
