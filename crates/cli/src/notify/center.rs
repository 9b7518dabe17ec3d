// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use pulse_core::{Event, Topic};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::alert::{Alert, AlertBoard, AlertEvent, AlertId};
use super::chime::Chime;
use super::classify::{Classifier, DEFAULT_CRITICAL_KEYWORDS};
use crate::broker::{Broker, Subscription};

/// Configuration for the notification center.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Notifications kept in history; older ones are evicted.
    pub history_limit: usize,
    /// How long an alert stays up unless dismissed.
    pub display: Duration,
    pub critical_keywords: Vec<String>,
    /// Play the chime for critical notifications.
    pub sound: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            history_limit: 50,
            display: Duration::from_millis(5000),
            critical_keywords: DEFAULT_CRITICAL_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            sound: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub event: Event,
    pub critical: bool,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

/// Snapshot of the history, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationState {
    pub unread_count: usize,
    pub history: Vec<Notification>,
}

struct Inner {
    config: NotifyConfig,
    classifier: Classifier,
    chime: Arc<dyn Chime>,
    history: Mutex<VecDeque<Notification>>,
    next_id: AtomicU64,
    alerts: AlertBoard,
}

/// Records server events as notifications and drives transient alerts.
///
/// The unread count is always computed from the history, never stored.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

impl NotificationCenter {
    pub fn new(config: NotifyConfig, chime: Arc<dyn Chime>) -> Self {
        let classifier = Classifier::new(&config.critical_keywords);
        NotificationCenter {
            inner: Arc::new(Inner {
                config,
                classifier,
                chime,
                history: Mutex::new(VecDeque::new()),
                next_id: AtomicU64::new(1),
                alerts: AlertBoard::new(),
            }),
        }
    }

    pub fn classify(&self, event: &Event) -> bool {
        self.inner.classifier.classify(event)
    }

    /// Adds a notification to the front of the history.
    ///
    /// Critical notifications also play the chime. A chime failure is
    /// logged and otherwise ignored.
    pub fn record(&self, event: &Event) -> Notification {
        self.inner.record(event)
    }

    /// Shows a transient alert for `event`.
    pub fn display(&self, event: &Event) -> AlertId {
        self.inner.display(event)
    }

    /// Dismisses an alert early.
    pub fn dismiss(&self, id: AlertId) -> bool {
        self.inner.alerts.dismiss(id)
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.inner.alerts.alerts()
    }

    pub fn alert_events(&self) -> broadcast::Receiver<AlertEvent> {
        self.inner.alerts.events()
    }

    /// Returns false if no notification has `id`.
    pub fn mark_read(&self, id: u64) -> bool {
        let mut history = self.inner.history.lock();
        match history.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&self) {
        self.inner.history.lock().iter_mut().for_each(|n| n.read = true);
    }

    /// Empties the history and dismisses every alert.
    pub fn clear_all(&self) {
        self.inner.history.lock().clear();
        self.inner.alerts.clear();
    }

    pub fn unread_count(&self) -> usize {
        self.inner.history.lock().iter().filter(|n| !n.read).count()
    }

    pub fn state(&self) -> NotificationState {
        let history: Vec<Notification> = self.inner.history.lock().iter().cloned().collect();
        let unread_count = history.iter().filter(|n| !n.read).count();
        NotificationState { unread_count, history }
    }

    /// Records and displays every server event published on `broker`.
    pub fn attach(&self, broker: &Broker) -> Vec<Subscription> {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        broker.subscribe_all(&Topic::SERVER, move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.record(event);
                inner.display(event);
            }
        })
    }
}

impl Inner {
    fn record(&self, event: &Event) -> Notification {
        let critical = self.classifier.classify(event);
        let notification = Notification {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            event: event.clone(),
            critical,
            created_at: Utc::now(),
            read: false,
        };

        {
            let mut history = self.history.lock();
            history.push_front(notification.clone());
            history.truncate(self.config.history_limit);
        }
        debug!(id = notification.id, topic = %event.topic(), critical, "recorded notification");

        if critical && self.config.sound {
            if let Err(e) = self.chime.play() {
                warn!(error = %e, "could not play chime");
            }
        }
        notification
    }

    fn display(&self, event: &Event) -> AlertId {
        let critical = self.classifier.classify(event);
        self.alerts.show(event.clone(), critical, self.config.display)
    }
}

#[cfg(test)]
#[path = "center_tests.rs"]
mod tests;
