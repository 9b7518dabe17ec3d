// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use pulse_core::{ClockSource, Event, Topic};
use serde_json::Value;
use tracing::{debug, error};

use crate::connection::{ConnectionConfig, ConnectionManager, Connector, EventSink};

/// A subscriber callback.
pub type Callback = Arc<dyn Fn(&Event) + Send + Sync>;

struct Entry {
    id: u64,
    callback: Callback,
}

struct BrokerInner {
    connection: ConnectionManager,
    subscribers: Mutex<HashMap<Topic, Vec<Entry>>>,
    next_id: AtomicU64,
    started: AtomicBool,
    auth_token: Option<String>,
}

/// Forwards connection events into the broker without keeping it alive.
struct BrokerSink(Weak<BrokerInner>);

impl EventSink for BrokerSink {
    fn deliver(&self, event: Event) {
        if let Some(inner) = self.0.upgrade() {
            inner.publish(&event);
        }
    }
}

/// Topic registry for one endpoint.
///
/// Server pushes arriving on the broker's connection are published to
/// every callback registered for their topic, in registration order.
/// The connection is opened lazily by the first subscription.
#[derive(Clone)]
pub struct Broker {
    inner: Arc<BrokerInner>,
}

impl Broker {
    pub fn new(
        config: ConnectionConfig,
        connector: Arc<dyn Connector>,
        clock: Arc<dyn ClockSource>,
        auth_token: Option<String>,
    ) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<BrokerInner>| {
            let sink = Arc::new(BrokerSink(weak.clone()));
            BrokerInner {
                connection: ConnectionManager::new(config, connector, sink, clock),
                subscribers: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                started: AtomicBool::new(false),
                auth_token,
            }
        });
        Broker { inner }
    }

    pub fn endpoint(&self) -> &str {
        self.inner.connection.url()
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.inner.connection
    }

    /// Registers `callback` for `topic`.
    ///
    /// The first subscription this broker ever sees starts the connection.
    pub fn subscribe<F>(&self, topic: Topic, callback: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.register(topic, Arc::new(callback))
    }

    /// Registers one callback for several topics.
    pub fn subscribe_all<F>(&self, topics: &[Topic], callback: F) -> Vec<Subscription>
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(callback);
        topics.iter().map(|topic| self.register(*topic, Arc::clone(&callback))).collect()
    }

    fn register(&self, topic: Topic, callback: Callback) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.lock().entry(topic).or_default().push(Entry { id, callback });
        debug!(%topic, id, "subscribed");

        if !self.inner.started.load(Ordering::Acquire)
            && self.inner.connection.connect(self.inner.auth_token.clone())
        {
            self.inner.started.store(true, Ordering::Release);
        }

        Subscription { topic, id, broker: Arc::downgrade(&self.inner), active: AtomicBool::new(true) }
    }

    /// Delivers `event` to the subscribers of its topic.
    ///
    /// Returns the number of callbacks that completed. A panicking callback
    /// is logged and skipped; the rest still run.
    pub fn publish(&self, event: &Event) -> usize {
        self.inner.publish(event)
    }

    /// Subscribers registered for `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.inner.subscribers.lock().get(&topic).map_or(0, Vec::len)
    }

    /// Subscribers across all topics.
    pub fn total_subscribers(&self) -> usize {
        self.inner.subscribers.lock().values().map(Vec::len).sum()
    }

    /// Sends a message on the connection, queueing it while disconnected.
    pub fn send(&self, kind: impl Into<String>, payload: Value) {
        self.inner.connection.send(kind, payload);
    }

    /// Re-arms the connection after `gave_up` or `disconnect`.
    pub fn reconnect(&self) {
        if self.inner.connection.connect(self.inner.auth_token.clone()) {
            self.inner.started.store(true, Ordering::Release);
        }
    }

    pub async fn disconnect(&self) {
        self.inner.connection.disconnect().await;
    }

    /// Removes every subscriber. The broker itself stays usable.
    pub fn clear_subscribers(&self) {
        self.inner.subscribers.lock().clear();
    }
}

impl BrokerInner {
    fn publish(&self, event: &Event) -> usize {
        let topic = event.topic();
        let callbacks: Vec<Callback> = {
            let subscribers = self.subscribers.lock();
            match subscribers.get(&topic) {
                Some(entries) => entries.iter().map(|e| Arc::clone(&e.callback)).collect(),
                None => return 0,
            }
        };

        let mut completed = 0;
        for callback in callbacks {
            match catch_unwind(AssertUnwindSafe(|| callback(event))) {
                Ok(()) => completed += 1,
                Err(_) => error!(%topic, "subscriber callback panicked"),
            }
        }
        completed
    }

    fn remove(&self, topic: Topic, id: u64) {
        let mut subscribers = self.subscribers.lock();
        if let Some(entries) = subscribers.get_mut(&topic) {
            entries.retain(|e| e.id != id);
            if entries.is_empty() {
                subscribers.remove(&topic);
            }
        }
    }
}

/// Handle to one registered callback.
///
/// Dropping the handle leaves the callback registered; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    topic: Topic,
    id: u64,
    broker: Weak<BrokerInner>,
    active: AtomicBool,
}

impl Subscription {
    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Removes the callback. Safe to call repeatedly, and after the broker
    /// has been dropped.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(inner) = self.broker.upgrade() {
            inner.remove(self.topic, self.id);
            debug!(topic = %self.topic, id = self.id, "unsubscribed");
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;
