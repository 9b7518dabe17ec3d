// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline mutation queue.
//!
//! # Features
//!
//! - Pending operations persisted as a JSON array after every change
//! - Serial replay in enqueue order on each offline to online transition
//! - Failed replays kept with a failure count, surfaced past a threshold

mod queue;
mod store;

pub use queue::{OfflineConfig, OfflineQueue, Submission, SyncReport};
pub use store::{JsonFileStore, MemoryStore, QueueStore, StoreError, StoreResult};
