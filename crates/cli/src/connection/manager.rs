// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle of one push channel.
//!
//! A [`ConnectionManager`] owns at most one session task at a time. The task
//! holds the transport and the heartbeat; everything else it shares with the
//! manager sits behind short, non-async critical sections.
//!
//! ```text
//!  connect() ──► Connecting ──ok──► Connected ──close/error──┐
//!                   │                                        │
//!                   └──fail──► attempt < max ? ──yes──► sleep(base * 2^attempt)
//!                                   │                        │
//!                                   no ──► GaveUp            └──► Connecting
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pulse_core::protocol::PONG;
use pulse_core::{ClockSource, Event, InboundEnvelope, OutboundEnvelope};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::transport::{Connector, Transport, TransportError};

/// Receives every event a connection produces.
pub trait EventSink: Send + Sync {
    fn deliver(&self, event: Event);
}

impl<F> EventSink for F
where
    F: Fn(Event) + Send + Sync,
{
    fn deliver(&self, event: Event) {
        self(event)
    }
}

/// Lifecycle state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closing,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Closing => "closing",
        })
    }
}

/// Configuration for the connection manager.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// URL to connect to.
    pub url: String,
    /// Delay before the first reconnect; doubled for each later one.
    pub base_delay: Duration,
    /// Reconnects scheduled before giving up.
    pub max_attempts: u32,
    /// Interval between `ping` messages. Zero disables the heartbeat.
    pub heartbeat_interval: Duration,
    /// Messages held while disconnected (0 = unbounded).
    pub outbound_limit: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8000/ws".to_string(),
            base_delay: Duration::from_millis(1000),
            max_attempts: 5,
            heartbeat_interval: Duration::from_secs(30),
            outbound_limit: 1000,
        }
    }
}

/// Delay before reconnect number `attempt + 1`: `base * 2^attempt`.
pub fn reconnect_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

struct Session {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
    finished: Arc<AtomicBool>,
}

impl Session {
    fn is_alive(&self) -> bool {
        !self.cancel.is_cancelled() && !self.finished.load(Ordering::Acquire)
    }
}

struct Shared {
    state: Mutex<ConnectionState>,
    attempt: AtomicU32,
    outbound: Mutex<VecDeque<OutboundEnvelope>>,
    outbound_ready: Notify,
}

impl Shared {
    fn set_state(&self, state: ConnectionState) {
        *self.state.lock() = state;
    }

    fn push_outbound(&self, env: OutboundEnvelope, limit: usize) {
        let dropped = {
            let mut queue = self.outbound.lock();
            let dropped = if limit > 0 && queue.len() >= limit { queue.pop_front() } else { None };
            queue.push_back(env);
            dropped
        };
        if let Some(dropped) = dropped {
            warn!(kind = %dropped.kind, limit, "outbound queue full, dropped oldest message");
        }
        self.outbound_ready.notify_one();
    }
}

/// Manages one push channel: connect, reconnect with backoff, heartbeat,
/// and buffering of outbound messages while the channel is down.
///
/// Nothing is returned as an error past this type. Failures surface as
/// [`Event::ConnectError`], [`Event::Error`] and [`Event::Disconnected`].
pub struct ConnectionManager {
    config: ConnectionConfig,
    connector: Arc<dyn Connector>,
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn ClockSource>,
    shared: Arc<Shared>,
    session: Mutex<Option<Session>>,
}

impl ConnectionManager {
    pub fn new(
        config: ConnectionConfig,
        connector: Arc<dyn Connector>,
        sink: Arc<dyn EventSink>,
        clock: Arc<dyn ClockSource>,
    ) -> Self {
        Self {
            config,
            connector,
            sink,
            clock,
            shared: Arc::new(Shared {
                state: Mutex::new(ConnectionState::Disconnected),
                attempt: AtomicU32::new(0),
                outbound: Mutex::new(VecDeque::new()),
                outbound_ready: Notify::new(),
            }),
            session: Mutex::new(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    pub fn state(&self) -> ConnectionState {
        *self.shared.state.lock()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Current reconnect-attempt counter.
    pub fn attempt(&self) -> u32 {
        self.shared.attempt.load(Ordering::Acquire)
    }

    /// Messages waiting for the channel to open.
    pub fn outbound_len(&self) -> usize {
        self.shared.outbound.lock().len()
    }

    /// Starts the session task unless one is already alive.
    ///
    /// A session is alive while connecting, connected, or waiting to
    /// reconnect. After `GaveUp` or `disconnect` this re-arms from attempt 0.
    /// Returns false when no session could be started outside a runtime.
    pub fn connect(&self, auth_token: Option<String>) -> bool {
        let mut session = self.session.lock();
        if session.as_ref().is_some_and(Session::is_alive) {
            debug!(url = %self.config.url, "connect ignored, session already running");
            return true;
        }

        let Ok(runtime) = Handle::try_current() else {
            warn!(url = %self.config.url, "connect requires a tokio runtime");
            return false;
        };

        self.shared.attempt.store(0, Ordering::Release);
        self.shared.set_state(ConnectionState::Connecting);

        let cancel = CancellationToken::new();
        let finished = Arc::new(AtomicBool::new(false));
        let task = SessionTask {
            config: self.config.clone(),
            connector: Arc::clone(&self.connector),
            sink: Arc::clone(&self.sink),
            clock: Arc::clone(&self.clock),
            shared: Arc::clone(&self.shared),
            cancel: cancel.clone(),
            finished: Arc::clone(&finished),
            auth_token,
        };
        let handle = runtime.spawn(task.run());
        *session = Some(Session { cancel, handle, finished });
        true
    }

    /// Sends a message now if connected, otherwise queues it.
    pub fn send(&self, kind: impl Into<String>, payload: Value) {
        let env = OutboundEnvelope::new(kind, payload, self.clock.now_ms());
        self.shared.push_outbound(env, self.config.outbound_limit);
    }

    /// Closes the channel and permanently stops reconnection.
    ///
    /// Waits for the session task to close the transport and emit
    /// `Disconnected`.
    pub async fn disconnect(&self) {
        let session = self.stop();
        if let Some(session) = session {
            let _ = session.handle.await;
        }
        self.shared.set_state(ConnectionState::Disconnected);
    }

    /// Non-awaiting variant of [`disconnect`](Self::disconnect).
    pub fn shutdown(&self) {
        let _ = self.stop();
    }

    fn stop(&self) -> Option<Session> {
        self.shared.attempt.store(self.config.max_attempts, Ordering::Release);
        let session = self.session.lock().take();
        match &session {
            Some(s) if !s.handle.is_finished() => {
                self.shared.set_state(ConnectionState::Closing);
                s.cancel.cancel();
            }
            _ => self.shared.set_state(ConnectionState::Disconnected),
        }
        session
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

enum SessionEnd {
    Cancelled,
    Closed(String),
}

struct SessionTask {
    config: ConnectionConfig,
    connector: Arc<dyn Connector>,
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn ClockSource>,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    finished: Arc<AtomicBool>,
    auth_token: Option<String>,
}

impl SessionTask {
    async fn run(self) {
        let url = self.config.url.clone();
        loop {
            self.shared.set_state(ConnectionState::Connecting);
            let attempt = self.shared.attempt.load(Ordering::Acquire);
            let mut transport = self.connector.open();

            let connected = tokio::select! {
                _ = self.cancel.cancelled() => return self.closed_by_client(None).await,
                r = transport.connect(&url, self.auth_token.as_deref()) => r,
            };

            match connected {
                Ok(()) => {
                    self.shared.attempt.store(0, Ordering::Release);
                    self.shared.set_state(ConnectionState::Connected);
                    info!(%url, "connected");
                    self.sink.deliver(Event::Connected);

                    match self.serve(transport.as_mut()).await {
                        SessionEnd::Cancelled => return self.closed_by_client(Some(transport)).await,
                        SessionEnd::Closed(reason) => {
                            self.shared.set_state(ConnectionState::Disconnected);
                            warn!(%url, %reason, "connection lost");
                            self.sink.deliver(Event::Disconnected { reason });
                        }
                    }
                }
                Err(e) => {
                    self.shared.set_state(ConnectionState::Disconnected);
                    warn!(%url, attempt, error = %e, "connect failed");
                    self.sink.deliver(Event::ConnectError { attempt, message: e.to_string() });
                }
            }

            let attempt = self.shared.attempt.load(Ordering::Acquire);
            if attempt >= self.config.max_attempts {
                self.finished.store(true, Ordering::Release);
                warn!(%url, attempts = attempt, "giving up on reconnection");
                self.sink.deliver(Event::GaveUp { attempts: attempt });
                return;
            }

            let delay = reconnect_delay(self.config.base_delay, attempt);
            self.shared.attempt.store(attempt + 1, Ordering::Release);
            info!(%url, attempt = attempt + 1, delay_ms = delay.as_millis() as u64, "reconnecting");
            self.sink.deliver(Event::Reconnecting {
                attempt: attempt + 1,
                delay_ms: delay.as_millis() as u64,
            });

            tokio::select! {
                _ = self.cancel.cancelled() => return self.closed_by_client(None).await,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn closed_by_client(&self, transport: Option<Box<dyn Transport>>) {
        if let Some(mut transport) = transport {
            if let Err(e) = transport.disconnect().await {
                debug!(error = %e, "error closing transport");
            }
        }
        self.shared.set_state(ConnectionState::Disconnected);
        info!(url = %self.config.url, "disconnected");
        self.sink.deliver(Event::Disconnected { reason: "client disconnect".to_string() });
    }

    async fn serve(&self, transport: &mut dyn Transport) -> SessionEnd {
        if let Err(reason) = self.flush(transport).await {
            return SessionEnd::Closed(reason);
        }

        let mut heartbeat = self.heartbeat();

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return SessionEnd::Cancelled,
                _ = self.shared.outbound_ready.notified() => {
                    if let Err(reason) = self.flush(transport).await {
                        return SessionEnd::Closed(reason);
                    }
                }
                _ = tick(&mut heartbeat) => {
                    if let Err(e) = transport.send(OutboundEnvelope::ping(self.clock.now_ms())).await {
                        return self.transport_failed(e);
                    }
                }
                frame = transport.recv() => match frame {
                    Ok(Some(env)) => self.dispatch(env),
                    Ok(None) => return SessionEnd::Closed("closed by server".to_string()),
                    Err(TransportError::Malformed(e)) => debug!(error = %e, "dropping malformed frame"),
                    Err(e) => return self.transport_failed(e),
                },
            }
        }
    }

    /// Sends queued messages in FIFO order.
    ///
    /// A message that fails to send goes back to the head of the queue.
    async fn flush(&self, transport: &mut dyn Transport) -> Result<(), String> {
        loop {
            let next = self.shared.outbound.lock().pop_front();
            let Some(env) = next else { return Ok(()) };
            if let Err(e) = transport.send(env.clone()).await {
                self.shared.outbound.lock().push_front(env);
                self.sink.deliver(Event::Error { message: e.to_string() });
                return Err(e.to_string());
            }
        }
    }

    fn transport_failed(&self, e: TransportError) -> SessionEnd {
        self.sink.deliver(Event::Error { message: e.to_string() });
        SessionEnd::Closed(e.to_string())
    }

    fn dispatch(&self, env: InboundEnvelope) {
        if env.kind == PONG {
            return;
        }
        match Event::from_envelope(&env) {
            Some(event) => self.sink.deliver(event),
            None => debug!(kind = %env.kind, "ignoring unrecognized message"),
        }
    }

    fn heartbeat(&self) -> Option<Interval> {
        let period = self.config.heartbeat_interval;
        if period.is_zero() {
            return None;
        }
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Some(interval)
    }
}

async fn tick(heartbeat: &mut Option<Interval>) {
    match heartbeat {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
