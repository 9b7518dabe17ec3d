// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Benchmarks for broker fan-out.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pulse_core::{Event, SystemClock, Topic};
use pulse_sync::broker::Broker;
use pulse_sync::connection::{ConnectionConfig, WebSocketConnector};
use serde_json::json;

/// A broker with `n` counting subscribers on `item_updated`.
///
/// No runtime is running, so the first subscription does not connect.
fn broker_with(n: usize, counter: &Arc<AtomicU64>) -> (Broker, Vec<pulse_sync::broker::Subscription>) {
    let broker = Broker::new(
        ConnectionConfig::default(),
        Arc::new(WebSocketConnector),
        Arc::new(SystemClock),
        None,
    );
    let subs = (0..n)
        .map(|_| {
            let counter = Arc::clone(counter);
            broker.subscribe(Topic::ItemUpdated, move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
            })
        })
        .collect();
    (broker, subs)
}

fn publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish");
    let event = Event::ItemUpdated(json!({"id": 42, "name": "Bolt", "qty": 7}));

    for n in [1usize, 10, 100] {
        let counter = Arc::new(AtomicU64::new(0));
        let (broker, _subs) = broker_with(n, &counter);
        group.bench_with_input(BenchmarkId::new("subscribers", n), &event, |b, e| {
            b.iter(|| broker.publish(e))
        });
    }

    let counter = Arc::new(AtomicU64::new(0));
    let (broker, _subs) = broker_with(10, &counter);
    let unrouted = Event::ItemDeleted(json!({"id": 42}));
    group.bench_function("no_subscribers_for_topic", |b| b.iter(|| broker.publish(&unrouted)));
    group.finish();
}

criterion_group!(benches, publish);
criterion_main!(benches);
