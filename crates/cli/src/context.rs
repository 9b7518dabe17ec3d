// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Application-wide wiring of brokers, the offline queue and notifications.

use std::sync::Arc;

use pulse_core::{ClockSource, Event, OpDescriptor, SystemClock, Topic};
use tracing::info;

use crate::broker::{Broker, BrokerRegistry, Subscription};
use crate::config::Config;
use crate::connection::Connector;
use crate::data::DataAccess;
use crate::error::Result;
use crate::fetch::CoordinatedFetcher;
use crate::notify::{Chime, NotificationCenter, NotificationState};
use crate::offline::{JsonFileStore, OfflineQueue, QueueStore, Submission};

/// Owns every long-lived component.
///
/// Create one with [`SyncContext::new`] at startup and call
/// [`shutdown`](SyncContext::shutdown) before exiting.
pub struct SyncContext {
    config: Config,
    data: Arc<dyn DataAccess>,
    registry: BrokerRegistry,
    queue: OfflineQueue,
    notifications: NotificationCenter,
}

impl SyncContext {
    /// Builds the context with the queue persisted at [`Config::queue_path`].
    pub fn new(
        config: Config,
        connector: Arc<dyn Connector>,
        data: Arc<dyn DataAccess>,
        chime: Arc<dyn Chime>,
    ) -> Result<Self> {
        let store = Arc::new(JsonFileStore::new(config.queue_path()));
        Self::with_parts(config, connector, data, chime, store, Arc::new(SystemClock))
    }

    /// Builds the context from explicit parts.
    pub fn with_parts(
        config: Config,
        connector: Arc<dyn Connector>,
        data: Arc<dyn DataAccess>,
        chime: Arc<dyn Chime>,
        store: Arc<dyn QueueStore>,
        clock: Arc<dyn ClockSource>,
    ) -> Result<Self> {
        let registry = BrokerRegistry::new(
            config.connection_config(),
            connector,
            Arc::clone(&clock),
            config.token().map(str::to_string),
        );
        let queue = OfflineQueue::open(store, Arc::clone(&data), clock, config.offline_config())?;
        let notifications = NotificationCenter::new(config.notify_config(), chime);
        Ok(SyncContext { config, data, registry, queue, notifications })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &BrokerRegistry {
        &self.registry
    }

    pub fn queue(&self) -> &OfflineQueue {
        &self.queue
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// The broker for the configured endpoint.
    pub fn broker(&self) -> Result<Broker> {
        Ok(self.registry.get(self.config.endpoint()?))
    }

    /// Subscribes on the configured endpoint's broker.
    pub fn subscribe<F>(&self, topic: Topic, callback: F) -> Result<Subscription>
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        Ok(self.broker()?.subscribe(topic, callback))
    }

    /// Routes server events on the configured endpoint into the notification center.
    pub fn attach_notifications(&self) -> Result<Vec<Subscription>> {
        Ok(self.notifications.attach(&self.broker()?))
    }

    /// A fetcher kept current by server events on the configured endpoint.
    ///
    /// Drop the subscriptions' callbacks with `unsubscribe` when the list
    /// is no longer shown.
    pub fn fetcher(&self) -> Result<(CoordinatedFetcher, Vec<Subscription>)> {
        let broker = self.broker()?;
        let fetcher = CoordinatedFetcher::new(Arc::clone(&self.data), self.config.fetch_config());
        let subs = fetcher.attach(&broker);
        Ok((fetcher, subs))
    }

    pub async fn enqueue_when_offline(&self, operation: OpDescriptor) -> Result<Submission> {
        self.queue.enqueue_when_offline(operation).await
    }

    pub fn notification_state(&self) -> NotificationState {
        self.notifications.state()
    }

    /// Disconnects every broker and stops background work.
    pub async fn shutdown(&self) {
        info!(brokers = self.registry.len(), "shutting down");
        self.queue.stop_watching();
        self.registry.shutdown().await;
        self.notifications.clear_all();
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
