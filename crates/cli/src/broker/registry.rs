// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use pulse_core::ClockSource;
use tracing::info;

use super::broker::Broker;
use crate::connection::{ConnectionConfig, Connector};

/// Trims whitespace and trailing slashes so equivalent URLs share a broker.
pub fn normalize_endpoint(endpoint: &str) -> String {
    endpoint.trim().trim_end_matches('/').to_string()
}

/// One [`Broker`] per endpoint for the lifetime of the registry.
pub struct BrokerRegistry {
    template: ConnectionConfig,
    connector: Arc<dyn Connector>,
    clock: Arc<dyn ClockSource>,
    auth_token: Option<String>,
    brokers: Mutex<HashMap<String, Broker>>,
}

impl BrokerRegistry {
    /// `template` supplies every setting but the URL.
    pub fn new(
        template: ConnectionConfig,
        connector: Arc<dyn Connector>,
        clock: Arc<dyn ClockSource>,
        auth_token: Option<String>,
    ) -> Self {
        BrokerRegistry { template, connector, clock, auth_token, brokers: Mutex::new(HashMap::new()) }
    }

    /// Returns the broker for `endpoint`, creating it on first use.
    pub fn get(&self, endpoint: &str) -> Broker {
        let key = normalize_endpoint(endpoint);
        let mut brokers = self.brokers.lock();
        brokers
            .entry(key.clone())
            .or_insert_with(|| {
                let config = ConnectionConfig { url: key, ..self.template.clone() };
                Broker::new(
                    config,
                    Arc::clone(&self.connector),
                    Arc::clone(&self.clock),
                    self.auth_token.clone(),
                )
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.brokers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Disconnects every broker and drops its subscribers.
    ///
    /// Brokers stay registered; a later `get` returns the same instance.
    pub async fn shutdown(&self) {
        let brokers: Vec<Broker> = self.brokers.lock().values().cloned().collect();
        for broker in brokers {
            info!(endpoint = broker.endpoint(), "shutting down broker");
            broker.disconnect().await;
            broker.clear_subscribers();
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
