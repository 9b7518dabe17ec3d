// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use pulse_core::{ClockSource, OpDescriptor, PendingOp};
use serde_json::Value;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::store::QueueStore;
use crate::data::DataAccess;
use crate::error::{Error, Result};
use crate::timer::ScopedTimer;

/// Limits for the offline queue.
#[derive(Debug, Clone)]
pub struct OfflineConfig {
    /// Pending operations held before new ones are rejected (0 = unbounded).
    pub max_pending: usize,
    /// Failure count at which an operation needs a person to look at it.
    pub attention_threshold: u32,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self { max_pending: 500, attention_threshold: 3 }
    }
}

/// Result of a replay pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncReport {
    Completed { replayed: usize, failed: usize, remaining: usize },
    /// Another pass was already running; nothing was done.
    AlreadyRunning,
}

/// How [`OfflineQueue::enqueue_when_offline`] handled an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Issued immediately; carries the response.
    Sent(Value),
    /// Held for replay.
    Queued(PendingOp),
}

struct Inner {
    store: Arc<dyn QueueStore>,
    data: Arc<dyn DataAccess>,
    clock: Arc<dyn ClockSource>,
    config: OfflineConfig,
    ops: Mutex<Vec<PendingOp>>,
    online: AtomicBool,
    syncing: AtomicBool,
    watcher: Mutex<Option<ScopedTimer>>,
}

/// Clears the re-entrancy flag when a pass ends, however it ends.
struct SyncGuard<'a>(&'a AtomicBool);

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Mutations made while offline, replayed in order once back online.
///
/// The list is persisted after every change. Replay is strictly serial:
/// each operation is awaited before the next starts.
#[derive(Clone)]
pub struct OfflineQueue {
    inner: Arc<Inner>,
}

impl OfflineQueue {
    /// Opens the queue, loading whatever the store already holds.
    ///
    /// The queue starts online.
    pub fn open(
        store: Arc<dyn QueueStore>,
        data: Arc<dyn DataAccess>,
        clock: Arc<dyn ClockSource>,
        config: OfflineConfig,
    ) -> Result<Self> {
        let ops = store.load()?;
        if !ops.is_empty() {
            info!(pending = ops.len(), "loaded pending operations");
        }
        Ok(OfflineQueue {
            inner: Arc::new(Inner {
                store,
                data,
                clock,
                config,
                ops: Mutex::new(ops),
                online: AtomicBool::new(true),
                syncing: AtomicBool::new(false),
                watcher: Mutex::new(None),
            }),
        })
    }

    pub fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::Acquire)
    }

    pub fn is_syncing(&self) -> bool {
        self.inner.syncing.load(Ordering::Acquire)
    }

    pub fn pending(&self) -> Vec<PendingOp> {
        self.inner.ops.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.ops.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Operations whose failure count reached the attention threshold.
    pub fn needs_attention(&self) -> Vec<PendingOp> {
        let threshold = self.inner.config.attention_threshold;
        self.inner.ops.lock().iter().filter(|op| op.failures >= threshold).cloned().collect()
    }

    /// Appends an operation and persists the list.
    pub fn enqueue(&self, operation: OpDescriptor) -> Result<PendingOp> {
        let op = PendingOp::new(operation, self.inner.clock.now_ms());
        let mut ops = self.inner.ops.lock();
        let limit = self.inner.config.max_pending;
        if limit > 0 && ops.len() >= limit {
            warn!(limit, "offline queue full, rejecting operation");
            return Err(Error::QueueFull { limit });
        }
        ops.push(op.clone());
        if let Err(e) = self.inner.store.save(&ops) {
            ops.pop();
            return Err(e.into());
        }
        debug!(id = %op.id, op = %op.operation, pending = ops.len(), "queued operation");
        Ok(op)
    }

    /// Issues the operation now when online; queues it otherwise.
    ///
    /// An immediate attempt that fails for lack of connectivity is queued
    /// too. Other failures are returned.
    pub async fn enqueue_when_offline(&self, operation: OpDescriptor) -> Result<Submission> {
        if !self.is_online() {
            return self.enqueue(operation).map(Submission::Queued);
        }
        match self.inner.data.request(operation.clone(), CancellationToken::new()).await {
            Ok(response) => Ok(Submission::Sent(response)),
            Err(e) if e.is_connectivity() => {
                debug!(error = %e, "request failed offline, queueing");
                self.enqueue(operation).map(Submission::Queued)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Records a connectivity change.
    ///
    /// Going from offline to online runs a replay pass and returns its
    /// report. Other transitions return `None`.
    pub async fn set_online(&self, online: bool) -> Option<SyncReport> {
        let was_online = self.inner.online.swap(online, Ordering::AcqRel);
        if was_online == online {
            return None;
        }
        info!(online, "connectivity changed");
        if online {
            Some(self.sync().await)
        } else {
            None
        }
    }

    /// Follows a connectivity signal until the sender goes away.
    ///
    /// When the signal already reads online, operations loaded from the
    /// store are replayed right away. Replaces any previous watcher.
    pub fn watch_connectivity(&self, mut signal: watch::Receiver<bool>) {
        let weak = Arc::downgrade(&self.inner);
        let timer = ScopedTimer::spawn(async move {
            let mut online = *signal.borrow_and_update();
            let mut first = true;
            loop {
                let Some(inner) = weak.upgrade() else { return };
                let queue = OfflineQueue { inner };
                let report = queue.set_online(online).await;
                if first && online && report.is_none() && !queue.is_empty() {
                    debug!(pending = queue.len(), "replaying backlog from previous run");
                    queue.sync().await;
                }
                first = false;
                drop(queue);
                if signal.changed().await.is_err() {
                    return;
                }
                online = *signal.borrow_and_update();
            }
        });
        *self.inner.watcher.lock() = timer;
    }

    /// Stops following the connectivity signal.
    pub fn stop_watching(&self) {
        self.inner.watcher.lock().take();
    }

    /// Replays pending operations in enqueue order.
    ///
    /// Successes are removed and failures kept with their count bumped; the
    /// list is persisted after each one. Failed operations are not retried
    /// within the pass.
    pub async fn sync(&self) -> SyncReport {
        if self.inner.syncing.swap(true, Ordering::AcqRel) {
            debug!("sync already running");
            return SyncReport::AlreadyRunning;
        }
        let _guard = SyncGuard(&self.inner.syncing);

        let ids: Vec<String> = self.inner.ops.lock().iter().map(|op| op.id.clone()).collect();
        let (mut replayed, mut failed) = (0, 0);

        for id in ids {
            let next = self.inner.ops.lock().iter().find(|op| op.id == id).cloned();
            // Cleared while the pass was running
            let Some(op) = next else { continue };

            let result = self.inner.data.request(op.operation.clone(), CancellationToken::new()).await;

            let mut ops = self.inner.ops.lock();
            match result {
                Ok(_) => {
                    ops.retain(|o| o.id != id);
                    replayed += 1;
                    debug!(%id, op = %op.operation, "replayed operation");
                }
                Err(e) => {
                    if let Some(o) = ops.iter_mut().find(|o| o.id == id) {
                        o.record_failure();
                        warn!(%id, op = %op.operation, failures = o.failures, error = %e, "replay failed");
                    }
                    failed += 1;
                }
            }
            if let Err(e) = self.inner.store.save(&ops) {
                warn!(error = %e, "failed to persist offline queue");
            }
        }

        let remaining = self.len();
        info!(replayed, failed, remaining, "sync pass complete");
        SyncReport::Completed { replayed, failed, remaining }
    }

    /// Empties the list and its persisted copy.
    pub fn clear(&self) -> Result<()> {
        let mut ops = self.inner.ops.lock();
        ops.clear();
        self.inner.store.clear()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
