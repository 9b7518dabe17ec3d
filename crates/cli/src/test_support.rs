// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test doubles for the connection, fetch and offline modules.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pulse_core::{Event, InboundEnvelope, ManualClock, OutboundEnvelope};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, Notify};
use tokio_util::sync::CancellationToken;

use crate::connection::{
    Connector, EventSink, Transport, TransportError, TransportFuture, TransportResult,
};
use crate::data::{DataAccess, DataError, DataFuture, Request};

pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(1_700_000_000_000))
}

/// Frames a [`MockServer`] can push to the live transport.
enum Frame {
    Envelope(InboundEnvelope),
    Malformed(String),
    Close,
    Error(String),
}

#[derive(Default)]
struct ServerState {
    fail_connects: usize,
    fail_sends: bool,
    connects: usize,
    disconnects: usize,
    tokens: Vec<Option<String>>,
    sent: Vec<OutboundEnvelope>,
    live: Option<mpsc::UnboundedSender<Frame>>,
}

/// In-memory stand-in for the push backend.
#[derive(Clone, Default)]
pub struct MockServer {
    state: Arc<Mutex<ServerState>>,
}

impl MockServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connector(&self) -> Arc<dyn Connector> {
        Arc::new(MockConnector { server: self.clone() })
    }

    /// Fails the next `n` connection attempts.
    pub fn fail_connects(&self, n: usize) {
        self.state.lock().fail_connects = n;
    }

    pub fn fail_sends(&self, fail: bool) {
        self.state.lock().fail_sends = fail;
    }

    pub fn connects(&self) -> usize {
        self.state.lock().connects
    }

    pub fn disconnects(&self) -> usize {
        self.state.lock().disconnects
    }

    pub fn tokens(&self) -> Vec<Option<String>> {
        self.state.lock().tokens.clone()
    }

    pub fn sent(&self) -> Vec<OutboundEnvelope> {
        self.state.lock().sent.clone()
    }

    pub fn sent_kinds(&self) -> Vec<String> {
        self.state.lock().sent.iter().map(|e| e.kind.clone()).collect()
    }

    pub fn is_live(&self) -> bool {
        self.state.lock().live.is_some()
    }

    fn push_frame(&self, frame: Frame) -> bool {
        let state = self.state.lock();
        state.live.as_ref().is_some_and(|tx| tx.send(frame).is_ok())
    }

    /// Pushes an envelope to the connected client.
    pub fn push(&self, kind: &str, data: Value) -> bool {
        self.push_frame(Frame::Envelope(InboundEnvelope::new(kind, data, Some(1))))
    }

    pub fn push_malformed(&self, text: &str) -> bool {
        self.push_frame(Frame::Malformed(text.to_string()))
    }

    /// Closes the live connection from the server side.
    pub fn close(&self) -> bool {
        let ok = self.push_frame(Frame::Close);
        self.state.lock().live = None;
        ok
    }

    /// Breaks the live connection with a transport error.
    pub fn break_connection(&self, message: &str) -> bool {
        let ok = self.push_frame(Frame::Error(message.to_string()));
        self.state.lock().live = None;
        ok
    }
}

struct MockConnector {
    server: MockServer,
}

impl Connector for MockConnector {
    fn open(&self) -> Box<dyn Transport> {
        Box::new(MockTransport { server: self.server.clone(), rx: None })
    }
}

pub struct MockTransport {
    server: MockServer,
    rx: Option<mpsc::UnboundedReceiver<Frame>>,
}

impl Transport for MockTransport {
    fn connect(&mut self, _url: &str, auth_token: Option<&str>) -> TransportFuture<'_, ()> {
        let token = auth_token.map(str::to_string);
        Box::pin(async move {
            let mut state = self.server.state.lock();
            state.connects += 1;
            state.tokens.push(token);
            if state.fail_connects > 0 {
                state.fail_connects -= 1;
                return Err(TransportError::ConnectionFailed("connection refused".into()));
            }
            let (tx, rx) = mpsc::unbounded_channel();
            state.live = Some(tx);
            drop(state);
            self.rx = Some(rx);
            Ok(())
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.rx = None;
            let mut state = self.server.state.lock();
            state.live = None;
            state.disconnects += 1;
            Ok(())
        })
    }

    fn send(&mut self, msg: OutboundEnvelope) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if self.rx.is_none() {
                return Err(TransportError::ConnectionClosed);
            }
            let mut state = self.server.state.lock();
            if state.fail_sends {
                return Err(TransportError::SendFailed("broken pipe".into()));
            }
            state.sent.push(msg);
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<InboundEnvelope>> {
        Box::pin(async move {
            let rx = self.rx.as_mut().ok_or(TransportError::ConnectionClosed)?;
            let frame: Option<Frame> = rx.recv().await;
            let result: TransportResult<Option<InboundEnvelope>> = match frame {
                Some(Frame::Envelope(env)) => return Ok(Some(env)),
                Some(Frame::Malformed(text)) => return Err(TransportError::Malformed(text)),
                Some(Frame::Close) | None => Ok(None),
                Some(Frame::Error(message)) => Err(TransportError::ReceiveFailed(message)),
            };
            self.rx = None;
            result
        })
    }

    fn is_connected(&self) -> bool {
        self.rx.is_some()
    }
}

/// Sink that records events and forwards them to a channel.
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
    tx: mpsc::UnboundedSender<Event>,
}

impl RecordingSink {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(RecordingSink { events: Mutex::new(Vec::new()), tx }), rx)
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }
}

impl EventSink for RecordingSink {
    fn deliver(&self, event: Event) {
        self.events.lock().push(event.clone());
        let _ = self.tx.send(event);
    }
}

/// Waits for the next event, failing the test after a generous timeout.
pub async fn next_event(rx: &mut mpsc::UnboundedReceiver<Event>) -> Event {
    tokio::time::timeout(Duration::from_secs(600), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Skips events until one matches `pred`.
pub async fn wait_for<F>(rx: &mut mpsc::UnboundedReceiver<Event>, pred: F) -> Event
where
    F: Fn(&Event) -> bool,
{
    loop {
        let event = next_event(rx).await;
        if pred(&event) {
            return event;
        }
    }
}

/// A request awaiting a scripted response.
pub struct PendingCall {
    pub request: Request,
    pub cancel: CancellationToken,
    respond: oneshot::Sender<Result<Value, DataError>>,
}

impl PendingCall {
    /// Resolves the call. Returns false if the caller already went away.
    pub fn respond(self, result: Result<Value, DataError>) -> bool {
        self.respond.send(result).is_ok()
    }
}

/// Data access whose responses are supplied by the test, one call at a time.
#[derive(Default)]
pub struct ScriptedDataAccess {
    calls: Mutex<VecDeque<PendingCall>>,
    arrived: Notify,
    total: AtomicUsize,
}

impl ScriptedDataAccess {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Waits for the next request to arrive.
    pub async fn next_call(&self) -> PendingCall {
        let wait = async {
            loop {
                let next = self.calls.lock().pop_front();
                if let Some(call) = next {
                    return call;
                }
                self.arrived.notified().await;
            }
        };
        tokio::time::timeout(Duration::from_secs(600), wait).await.expect("no request arrived")
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

impl DataAccess for ScriptedDataAccess {
    fn request(&self, request: Request, cancel: CancellationToken) -> DataFuture<'_> {
        let (tx, rx) = oneshot::channel();
        self.calls.lock().push_back(PendingCall { request, cancel, respond: tx });
        self.total.fetch_add(1, Ordering::SeqCst);
        self.arrived.notify_one();
        Box::pin(async move { rx.await.unwrap_or(Err(DataError::Cancelled)) })
    }
}

type Responder = dyn Fn(&Request) -> Result<Value, DataError> + Send + Sync;

/// Data access that answers immediately via a closure and records every call.
pub struct StubDataAccess {
    responder: Box<Responder>,
    calls: Mutex<Vec<Request>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubDataAccess {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&Request) -> Result<Value, DataError> + Send + Sync + 'static,
    {
        Arc::new(StubDataAccess {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn ok() -> Arc<Self> {
        Self::new(|_| Ok(Value::Null))
    }

    pub fn calls(&self) -> Vec<Request> {
        self.calls.lock().clone()
    }

    pub fn resources(&self) -> Vec<String> {
        self.calls.lock().iter().map(|r| r.resource.clone()).collect()
    }

    /// Highest number of requests observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl DataAccess for StubDataAccess {
    fn request(&self, request: Request, _cancel: CancellationToken) -> DataFuture<'_> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls.lock().push(request.clone());
            tokio::task::yield_now().await;
            let result = (self.responder)(&request);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        })
    }
}
