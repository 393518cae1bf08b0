//! EventStreamTransport port - client side of the realtime subscription.
//!
//! The consumer asks the transport to open a subscription and gets back a
//! stream of raw frame payloads (the text of each SSE `data:` field). The
//! HTTP adapter lives in `adapters::consumer`; tests script their own.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

use crate::domain::foundation::ClientId;

/// Stream of raw frame payloads. Ends when the server closes the connection.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

/// Transport-level failures. All of them lead to a reconnect attempt.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("subscription rejected with HTTP status {0}")]
    Status(u16),

    #[error("stream error: {0}")]
    Stream(String),
}

/// Opens subscriptions to the broadcast hub.
#[async_trait]
pub trait EventStreamTransport: Send + Sync {
    /// Open a new subscription, optionally announcing a client id.
    ///
    /// Resolves once the server has accepted the subscription; frames then
    /// arrive on the returned stream.
    async fn open(&self, client_id: Option<&ClientId>) -> Result<FrameStream, TransportError>;
}
