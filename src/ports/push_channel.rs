//! PushChannel port - the write half of one subscriber's event stream.
//!
//! The broadcast hub only needs to append text frames to an open
//! connection. Whether the frames end up on an SSE response, a test
//! recorder or something else is the adapter's business.

use thiserror::Error;

/// Why a frame could not be written to a subscriber.
///
/// Every variant is treated by the hub as an implicit disconnect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The peer is gone (response stream dropped, socket closed).
    #[error("channel closed")]
    Closed,

    /// The subscriber is not draining its buffer.
    #[error("channel buffer full")]
    Full,
}

/// Append-only, non-blocking write handle to a subscriber.
///
/// `push` must not wait on the network: it either queues the frame or
/// fails immediately. Dropping the channel ends the subscriber's stream.
pub trait PushChannel: Send + Sync {
    /// Queue one JSON frame for delivery.
    fn push(&self, frame: &str) -> Result<(), ChannelError>;
}
