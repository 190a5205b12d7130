//! Transport binding (spec §4.8): the duplex message channel abstraction
//! the session loop talks to, plus its axum WebSocket realization.
//!
//! Binary WebSocket messages carry codec packets 1:1 — one message is
//! one packet, matching the wire codec's framing assumption.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport closed")]
    Closed,
    #[error("transport error: {0}")]
    Backend(String),
}

/// A duplex, message-boundary-preserving channel. `recv` returns `Ok(None)`
/// when the peer closes the channel cleanly.
#[async_trait]
pub trait DuplexChannel: Send {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
    async fn send(&mut self, bytes: Vec<u8>) -> Result<(), TransportError>;
}

/// [`DuplexChannel`] backed by an axum-upgraded WebSocket.
pub struct WebSocketChannel {
    socket: WebSocket,
}

impl WebSocketChannel {
    #[must_use]
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

#[async_trait]
impl DuplexChannel for WebSocketChannel {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            match self.socket.recv().await {
                None => return Ok(None),
                Some(Ok(Message::Binary(bytes))) => return Ok(Some(bytes.into())),
                Some(Ok(Message::Close(_))) => return Ok(None),
                // Text/ping/pong frames carry no packet; keep waiting.
                Some(Ok(_)) => continue,
                Some(Err(err)) => return Err(TransportError::Backend(err.to_string())),
            }
        }
    }

    async fn send(&mut self, bytes: Vec<u8>) -> Result<(), TransportError> {
        self.socket
            .send(Message::Binary(bytes.into()))
            .await
            .map_err(|e| TransportError::Backend(e.to_string()))
    }
}

#[cfg(test)]
pub mod fakes {
    use super::{DuplexChannel, TransportError};
    use async_trait::async_trait;
    use std::collections::VecDeque;

    /// An in-memory [`DuplexChannel`] driven by a canned inbound queue,
    /// for session-level tests that must not open a real socket.
    pub struct FakeChannel {
        inbound: VecDeque<Vec<u8>>,
        pub outbound: Vec<Vec<u8>>,
    }

    impl FakeChannel {
        #[must_use]
        pub fn with_inbound(messages: Vec<Vec<u8>>) -> Self {
            Self {
                inbound: messages.into_iter().collect(),
                outbound: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl DuplexChannel for FakeChannel {
        async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
            // Once the script is exhausted, behave like an idle-but-open
            // connection rather than a closed one, so callers waiting on
            // in-flight work aren't racing a synthetic close.
            match self.inbound.pop_front() {
                Some(bytes) => Ok(Some(bytes)),
                None => std::future::pending().await,
            }
        }

        async fn send(&mut self, bytes: Vec<u8>) -> Result<(), TransportError> {
            self.outbound.push(bytes);
            Ok(())
        }
    }
}
