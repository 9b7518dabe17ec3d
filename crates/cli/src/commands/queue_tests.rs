// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::offline::MemoryStore;
use pulse_core::{Method, OpDescriptor, PendingOp};
use serde_json::json;

fn op(resource: &str, failures: u32) -> PendingOp {
    let mut op = PendingOp::new(OpDescriptor::new(Method::Patch, resource, json!({"qty": 1})), 0);
    op.failures = failures;
    op
}

fn output(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
    let mut out = Vec::new();
    f(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_list_empty() {
    let store = MemoryStore::new();
    let text = output(|out| list_impl(&store, 3, false, out));
    assert_eq!(text, "No pending operations.\n");
}

#[test]
fn test_list_in_order_with_attention() {
    let store = MemoryStore::with_ops(vec![op("items/1", 0), op("items/2", 4)]);
    let text = output(|out| list_impl(&store, 3, false, out));

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("PATCH items/1"));
    assert!(lines[1].contains("PATCH items/2"));
    assert!(lines[1].contains("(needs attention)"));
}

#[test]
fn test_list_json() {
    let store = MemoryStore::with_ops(vec![op("items/1", 1)]);
    let text = output(|out| list_impl(&store, 3, true, out));

    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed[0]["failures"], 1);
    assert_eq!(parsed[0]["operation"]["method"], "PATCH");
    assert_eq!(parsed[0]["operation"]["resource"], "items/1");
}

#[test]
fn test_clear_reports_count() {
    let store = MemoryStore::with_ops(vec![op("a", 0), op("b", 0)]);
    let text = output(|out| clear_impl(&store, out));

    assert_eq!(text, "Cleared 2 pending operations.\n");
    assert!(store.snapshot().is_empty());
}
