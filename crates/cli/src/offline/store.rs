// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable storage for the pending-operation list.
//!
//! The whole list is rewritten on every change. [`JsonFileStore`] writes a
//! temporary sibling, fsyncs it, then renames it over the target so a crash
//! leaves either the old list or the new one, never a torn file.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use pulse_core::PendingOp;

/// Error type for queue storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persists the ordered list of pending operations.
pub trait QueueStore: Send + Sync {
    fn load(&self) -> StoreResult<Vec<PendingOp>>;
    fn save(&self, ops: &[PendingOp]) -> StoreResult<()>;
    fn clear(&self) -> StoreResult<()>;
}

/// Stores the list as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl QueueStore for JsonFileStore {
    fn load(&self) -> StoreResult<Vec<PendingOp>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&self, ops: &[PendingOp]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.temp_path();
        let json = serde_json::to_vec_pretty(ops)?;
        let mut file = File::create(&tmp)?;
        file.write_all(&json)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps the list in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ops: Mutex<Vec<PendingOp>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ops(ops: Vec<PendingOp>) -> Self {
        MemoryStore { ops: Mutex::new(ops), saves: Mutex::new(0) }
    }

    /// Number of times the list has been saved.
    pub fn saves(&self) -> usize {
        *self.saves.lock()
    }

    pub fn snapshot(&self) -> Vec<PendingOp> {
        self.ops.lock().clone()
    }
}

impl QueueStore for MemoryStore {
    fn load(&self) -> StoreResult<Vec<PendingOp>> {
        Ok(self.ops.lock().clone())
    }

    fn save(&self, ops: &[PendingOp]) -> StoreResult<()> {
        *self.ops.lock() = ops.to_vec();
        *self.saves.lock() += 1;
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        self.ops.lock().clear();
        *self.saves.lock() += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
