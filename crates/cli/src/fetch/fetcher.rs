// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use pulse_core::event::record_key;
use pulse_core::{Event, Method, OpDescriptor, Topic};
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::filters::Filters;
use crate::broker::{Broker, Subscription};
use crate::data::{DataAccess, DataError};
use crate::timer::ScopedTimer;

/// Configuration for a fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Resource requested for list pages.
    pub resource: String,
    /// Quiet period before a query change is applied.
    pub debounce: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { resource: "logs".to_string(), debounce: Duration::from_millis(300) }
    }
}

/// Observable list state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchState {
    pub records: Vec<Value>,
    pub total: u64,
    pub page: u32,
    pub filters: Filters,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for FetchState {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            total: 0,
            page: 1,
            filters: Filters::default(),
            loading: false,
            error: None,
        }
    }
}

/// How a fetch ended.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The result was written to state.
    Committed { token: u64, count: usize },
    /// The request failed and the error was written to state.
    Failed { token: u64, error: DataError },
    /// A newer fetch was issued first; nothing was written.
    Stale { token: u64 },
}

/// What an event did to the current list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAction {
    Refetch,
    Prepended,
    Duplicate,
    Patched,
    Removed,
    Ignored,
}

struct Inflight {
    token: u64,
    cancel: CancellationToken,
}

struct Inner {
    data: Arc<dyn DataAccess>,
    config: FetchConfig,
    latest: AtomicU64,
    inflight: Mutex<Option<Inflight>>,
    state: watch::Sender<FetchState>,
    debounce: Mutex<Option<ScopedTimer>>,
}

/// Keeps one list view in sync with the backend.
///
/// Every fetch mints a token larger than all before it. Only the fetch
/// holding the latest token may write to state; older ones are cancelled
/// and their results dropped, errors included.
#[derive(Clone)]
pub struct CoordinatedFetcher {
    inner: Arc<Inner>,
}

impl CoordinatedFetcher {
    pub fn new(data: Arc<dyn DataAccess>, config: FetchConfig) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        CoordinatedFetcher {
            inner: Arc::new(Inner {
                data,
                config,
                latest: AtomicU64::new(0),
                inflight: Mutex::new(None),
                state,
                debounce: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> FetchState {
        self.inner.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<FetchState> {
        self.inner.state.subscribe()
    }

    /// Most recently minted token.
    pub fn latest_token(&self) -> u64 {
        self.inner.latest.load(Ordering::SeqCst)
    }

    /// Requests `page` of the list under `filters`.
    pub async fn fetch(&self, filters: Filters, page: u32) -> FetchOutcome {
        self.inner.fetch(filters, page).await
    }

    /// Re-runs the fetch for the current filters and page.
    pub async fn refresh(&self) -> FetchOutcome {
        let (filters, page) = self.inner.current();
        self.inner.fetch(filters, page).await
    }

    /// Changes the query text after the debounce window.
    ///
    /// Each call restarts the window; only the last text is fetched.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        let weak = Arc::downgrade(&self.inner);
        let timer = ScopedTimer::after(self.inner.config.debounce, async move {
            if let Some(inner) = weak.upgrade() {
                let (filters, _) = inner.current();
                inner.spawn_fetch(filters.with_query(query), 1);
            }
        });
        *self.inner.debounce.lock() = timer;
    }

    /// Sets a keyed filter and fetches page 1.
    pub async fn set_filter(&self, key: impl Into<String>, value: impl Into<String>) -> FetchOutcome {
        let (filters, _) = self.inner.current();
        self.inner.fetch(filters.with(key, value), 1).await
    }

    /// Removes a keyed filter and fetches page 1.
    pub async fn clear_filter(&self, key: &str) -> FetchOutcome {
        let (mut filters, _) = self.inner.current();
        filters.fields.remove(key);
        self.inner.fetch(filters, 1).await
    }

    pub async fn set_page(&self, page: u32) -> FetchOutcome {
        let (filters, _) = self.inner.current();
        self.inner.fetch(filters, page).await
    }

    /// Applies a server event to the list.
    ///
    /// A created record refetches page 1 but is prepended locally on later
    /// pages, so a user paging through history keeps their place.
    pub fn apply_event(&self, event: &Event) -> UpdateAction {
        self.inner.apply_event(event)
    }

    /// Wires [`apply_event`](Self::apply_event) to a broker's item topics.
    pub fn attach(&self, broker: &Broker) -> Vec<Subscription> {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        broker.subscribe_all(
            &[Topic::ItemCreated, Topic::ItemUpdated, Topic::ItemDeleted],
            move |event| {
                if let Some(inner) = weak.upgrade() {
                    inner.apply_event(event);
                }
            },
        )
    }
}

impl Inner {
    fn current(&self) -> (Filters, u32) {
        let state = self.state.borrow();
        (state.filters.clone(), state.page)
    }

    async fn fetch(&self, filters: Filters, page: u32) -> FetchOutcome {
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();
        let previous = self.inflight.lock().replace(Inflight { token, cancel: cancel.clone() });
        if let Some(previous) = previous {
            debug!(superseded = previous.token, token, "cancelling in-flight fetch");
            previous.cancel.cancel();
        }

        self.state.send_modify(|s| {
            s.filters = filters.clone();
            s.page = page;
            s.loading = true;
        });

        let request = OpDescriptor::new(Method::Get, self.config.resource.clone(), filters.to_params(page));
        let result = tokio::select! {
            _ = cancel.cancelled() => return FetchOutcome::Stale { token },
            r = self.data.request(request, cancel.clone()) => r,
        };

        {
            let mut inflight = self.inflight.lock();
            if inflight.as_ref().is_some_and(|f| f.token == token) {
                *inflight = None;
            }
        }

        let outcome = match result {
            Ok(body) => {
                let (records, total) = parse_page(body);
                let count = records.len();
                self.commit(token, |s| {
                    s.records = records;
                    s.total = total;
                    s.page = page;
                    s.error = None;
                })
                .then_some(FetchOutcome::Committed { token, count })
            }
            Err(error) => {
                let message = error.to_string();
                self.commit(token, |s| s.error = Some(message))
                    .then_some(FetchOutcome::Failed { token, error })
            }
        };
        outcome.unwrap_or_else(|| {
            debug!(token, "discarding stale fetch result");
            FetchOutcome::Stale { token }
        })
    }

    /// Writes to state only if `token` is still the latest. The check runs
    /// under the state lock so a newer fetch cannot interleave.
    fn commit<F>(&self, token: u64, update: F) -> bool
    where
        F: FnOnce(&mut FetchState),
    {
        self.state.send_if_modified(|s| {
            if self.latest.load(Ordering::SeqCst) != token {
                return false;
            }
            update(s);
            s.loading = false;
            true
        })
    }

    fn apply_event(self: &Arc<Self>, event: &Event) -> UpdateAction {
        let Some(record) = event.payload() else { return UpdateAction::Ignored };
        match event.topic() {
            Topic::ItemCreated => {
                if self.state.borrow().page == 1 {
                    self.spawn_refresh();
                    return UpdateAction::Refetch;
                }
                self.prepend(record)
            }
            Topic::ItemUpdated => self.patch(record),
            Topic::ItemDeleted => self.remove(record),
            _ => UpdateAction::Ignored,
        }
    }

    fn spawn_refresh(self: &Arc<Self>) {
        let (filters, page) = self.current();
        self.spawn_fetch(filters, page);
    }

    /// Runs a fetch detached from the caller, so restarting a debounce
    /// window never aborts a request that already started.
    fn spawn_fetch(self: &Arc<Self>, filters: Filters, page: u32) {
        let Ok(runtime) = Handle::try_current() else {
            warn!("fetch requires a tokio runtime");
            return;
        };
        let inner = Arc::clone(self);
        runtime.spawn(async move {
            inner.fetch(filters, page).await;
        });
    }

    fn prepend(&self, record: &Value) -> UpdateAction {
        let key = record_key(record);
        let mut action = UpdateAction::Prepended;
        self.state.send_if_modified(|s| {
            if key.is_some() && s.records.iter().any(|r| record_key(r) == key) {
                action = UpdateAction::Duplicate;
                return false;
            }
            s.records.insert(0, record.clone());
            s.total += 1;
            true
        });
        action
    }

    fn patch(&self, record: &Value) -> UpdateAction {
        let Some(key) = record_key(record) else { return UpdateAction::Ignored };
        let patched = self.state.send_if_modified(|s| {
            let Some(existing) = s.records.iter_mut().find(|r| record_key(r).as_ref() == Some(&key))
            else {
                return false;
            };
            merge(existing, record);
            true
        });
        if patched {
            UpdateAction::Patched
        } else {
            UpdateAction::Ignored
        }
    }

    fn remove(&self, record: &Value) -> UpdateAction {
        let Some(key) = record_key(record) else { return UpdateAction::Ignored };
        let removed = self.state.send_if_modified(|s| {
            let before = s.records.len();
            s.records.retain(|r| record_key(r).as_ref() != Some(&key));
            let removed = before != s.records.len();
            if removed {
                s.total = s.total.saturating_sub(1);
            }
            removed
        });
        if removed {
            UpdateAction::Removed
        } else {
            UpdateAction::Ignored
        }
    }
}

/// Shallow-merges the fields of `patch` into `target`.
fn merge(target: &mut Value, patch: &Value) {
    match (target.as_object_mut(), patch.as_object()) {
        (Some(target), Some(patch)) => {
            for (k, v) in patch {
                target.insert(k.clone(), v.clone());
            }
        }
        _ => *target = patch.clone(),
    }
}

/// Reads a list response: `{records|items|data: [...], total}` or a bare array.
fn parse_page(body: Value) -> (Vec<Value>, u64) {
    match body {
        Value::Array(records) => {
            let total = records.len() as u64;
            (records, total)
        }
        Value::Object(mut map) => {
            let records = ["records", "items", "data"]
                .iter()
                .find_map(|k| match map.remove(*k) {
                    Some(Value::Array(items)) => Some(items),
                    _ => None,
                })
                .unwrap_or_default();
            let total = map
                .get("total")
                .or_else(|| map.get("count"))
                .and_then(Value::as_u64)
                .unwrap_or(records.len() as u64);
            (records, total)
        }
        _ => (Vec::new(), 0),
    }
}

#[cfg(test)]
#[path = "fetcher_tests.rs"]
mod tests;
