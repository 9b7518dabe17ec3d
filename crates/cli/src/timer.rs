// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Task handles that cancel their work when dropped.
//!
//! Debounce windows, alert auto-dismissal and connectivity watchers each own
//! a [`ScopedTimer`]. Replacing or dropping the owner aborts the task, so no
//! timer outlives the thing it was scheduled for.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// A spawned task that is aborted when this handle is dropped.
#[derive(Debug)]
pub struct ScopedTimer {
    handle: JoinHandle<()>,
}

impl ScopedTimer {
    /// Spawns `task` on the current runtime.
    ///
    /// Returns `None` when called outside a tokio runtime.
    pub fn spawn<F>(task: F) -> Option<Self>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let runtime = Handle::try_current().ok()?;
        Some(ScopedTimer { handle: runtime.spawn(task) })
    }

    /// Runs `task` once `delay` has elapsed.
    pub fn after<F>(delay: Duration, task: F) -> Option<Self>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        })
    }

    /// Aborts the task if it has not run yet.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
