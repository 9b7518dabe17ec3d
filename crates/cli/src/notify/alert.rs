// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transient on-screen alerts.
//!
//! An alert ends exactly once: either the user dismisses it or its timer
//! does. Whichever removes it from the board first emits the single
//! `Dismissed` event; the other finds nothing to remove.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use pulse_core::Event;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::timer::ScopedTimer;

pub type AlertId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissReason {
    User,
    Timeout,
}

/// Lifecycle notifications for alerts.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertEvent {
    Shown { id: AlertId },
    Dismissed { id: AlertId, reason: DismissReason },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: AlertId,
    pub event: Event,
    pub critical: bool,
    pub shown_at: DateTime<Utc>,
}

struct Active {
    alert: Alert,
    _timer: Option<ScopedTimer>,
}

struct BoardInner {
    active: Mutex<Vec<Active>>,
    next_id: AtomicU64,
    events: broadcast::Sender<AlertEvent>,
}

/// Currently visible alerts and their auto-dismiss timers.
#[derive(Clone)]
pub struct AlertBoard {
    inner: Arc<BoardInner>,
}

impl Default for AlertBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertBoard {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        AlertBoard {
            inner: Arc::new(BoardInner { active: Mutex::new(Vec::new()), next_id: AtomicU64::new(1), events }),
        }
    }

    /// Shows an alert that dismisses itself after `ttl`.
    pub fn show(&self, event: Event, critical: bool, ttl: Duration) -> AlertId {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let weak: Weak<BoardInner> = Arc::downgrade(&self.inner);
        let timer = ScopedTimer::after(ttl, async move {
            if let Some(inner) = weak.upgrade() {
                inner.dismiss(id, DismissReason::Timeout);
            }
        });
        let alert = Alert { id, event, critical, shown_at: Utc::now() };
        self.inner.active.lock().push(Active { alert, _timer: timer });
        let _ = self.inner.events.send(AlertEvent::Shown { id });
        id
    }

    /// Dismisses an alert on the user's behalf.
    ///
    /// Returns false if it was already dismissed.
    pub fn dismiss(&self, id: AlertId) -> bool {
        self.inner.dismiss(id, DismissReason::User)
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.inner.active.lock().iter().map(|a| a.alert.clone()).collect()
    }

    pub fn events(&self) -> broadcast::Receiver<AlertEvent> {
        self.inner.events.subscribe()
    }

    /// Dismisses every alert as if by the user.
    pub fn clear(&self) {
        let ids: Vec<AlertId> = self.inner.active.lock().iter().map(|a| a.alert.id).collect();
        for id in ids {
            self.inner.dismiss(id, DismissReason::User);
        }
    }
}

impl BoardInner {
    fn dismiss(&self, id: AlertId, reason: DismissReason) -> bool {
        let removed = {
            let mut active = self.active.lock();
            active.iter().position(|a| a.alert.id == id).map(|i| active.remove(i))
        };
        let Some(removed) = removed else { return false };
        debug!(id, ?reason, "alert dismissed");
        let _ = self.events.send(AlertEvent::Dismissed { id, reason });
        // Dropping the entry aborts its timer; when the timer itself is
        // dismissing, the abort lands after this last step.
        drop(removed);
        true
    }
}

#[cfg(test)]
#[path = "alert_tests.rs"]
mod tests;
