// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for the push channel.
//!
//! Provides a trait-based transport layer that enables:
//! - Real WebSocket connections for production
//! - Mock transports for unit testing

use std::future::Future;
use std::pin::Pin;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use pulse_core::{InboundEnvelope, OutboundEnvelope};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// A frame could not be decoded. The connection is still usable.
    #[error("malformed frame: {0}")]
    Malformed(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Boxed future returned by transport methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// Transport trait for WebSocket-like communication.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send {
    /// Connect to a remote server, presenting `auth_token` when given.
    fn connect(&mut self, url: &str, auth_token: Option<&str>) -> TransportFuture<'_, ()>;

    /// Disconnect from the server.
    fn disconnect(&mut self) -> TransportFuture<'_, ()>;

    /// Send a message to the server.
    fn send(&mut self, msg: OutboundEnvelope) -> TransportFuture<'_, ()>;

    /// Receive a message from the server.
    ///
    /// Returns `None` if the connection is closed. Must be cancel safe: the
    /// session drops a pending `recv` whenever another branch fires.
    fn recv(&mut self) -> TransportFuture<'_, Option<InboundEnvelope>>;

    /// Check if connected.
    fn is_connected(&self) -> bool;
}

/// Creates a fresh transport for each connection attempt.
pub trait Connector: Send + Sync {
    fn open(&self) -> Box<dyn Transport>;
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport implementation using tokio-tungstenite.
#[derive(Default)]
pub struct WebSocketTransport {
    ws: Option<WebSocketConnection>,
}

struct WebSocketConnection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        WebSocketTransport { ws: None }
    }
}

impl Transport for WebSocketTransport {
    fn connect(&mut self, url: &str, auth_token: Option<&str>) -> TransportFuture<'_, ()> {
        let url = url.to_string();
        let bearer = auth_token.map(|t| format!("Bearer {t}"));
        Box::pin(async move {
            let mut request = url
                .into_client_request()
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
            if let Some(bearer) = bearer {
                let value = HeaderValue::from_str(&bearer)
                    .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
                request.headers_mut().insert(AUTHORIZATION, value);
            }

            let (ws_stream, _) = tokio_tungstenite::connect_async(request)
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            let (sink, stream) = ws_stream.split();
            self.ws = Some(WebSocketConnection { sink, stream });
            Ok(())
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if let Some(mut ws) = self.ws.take() {
                let _ = ws.sink.close().await;
            }
            Ok(())
        })
    }

    fn send(&mut self, msg: OutboundEnvelope) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;

            let json = msg.to_json().map_err(|e| TransportError::SendFailed(e.to_string()))?;

            if let Err(e) = ws.sink.send(Message::Text(json.into())).await {
                // Connection is broken, clear it
                self.ws = None;
                return Err(TransportError::SendFailed(e.to_string()));
            }

            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<InboundEnvelope>> {
        Box::pin(async move {
            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;

            loop {
                match ws.stream.next().await {
                    Some(Ok(Message::Text(text))) => {
                        return InboundEnvelope::from_json(&text)
                            .map(Some)
                            .map_err(|e| TransportError::Malformed(e.to_string()));
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        self.ws = None;
                        return Ok(None);
                    }
                    // Protocol-level ping/pong and binary frames carry no events
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        self.ws = None;
                        return Err(TransportError::ReceiveFailed(e.to_string()));
                    }
                }
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.ws.is_some()
    }
}

/// Opens a [`WebSocketTransport`] per attempt.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    fn open(&self) -> Box<dyn Transport> {
        Box::new(WebSocketTransport::new())
    }
}
