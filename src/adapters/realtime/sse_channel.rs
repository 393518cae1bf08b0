//! Server-Sent Events transport for the broadcast hub.
//!
//! Each subscriber gets a bounded mpsc queue. The hub holds the sending
//! half as its [`PushChannel`]; the receiving half becomes the body of the
//! `text/event-stream` response. When either side goes away the other
//! notices: the hub sees `Closed` on the next write, and the response
//! stream ends when the hub drops the sender.

use std::convert::Infallible;
use std::sync::Arc;

use axum::response::sse::Event;
use futures::Stream;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::ports::{ChannelError, PushChannel};

use super::hub::{BroadcastHub, Registration};

/// Sending half of one subscriber's SSE stream.
pub struct SseChannel {
    tx: mpsc::Sender<String>,
}

impl SseChannel {
    /// Create a channel buffering at most `capacity` undelivered frames.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl PushChannel for SseChannel {
    fn push(&self, frame: &str) -> Result<(), ChannelError> {
        self.tx.try_send(frame.to_owned()).map_err(|e| match e {
            TrySendError::Full(_) => ChannelError::Full,
            TrySendError::Closed(_) => ChannelError::Closed,
        })
    }
}

/// Removes the registration from the hub when the response stream is dropped.
///
/// axum drops the body stream as soon as the client goes away, which makes
/// this the hub's closure observer.
pub struct SubscriptionGuard {
    hub: Arc<BroadcastHub>,
    registration: Registration,
}

impl SubscriptionGuard {
    pub fn new(hub: Arc<BroadcastHub>, registration: Registration) -> Self {
        Self { hub, registration }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.hub.deregister(&self.registration);
    }
}

/// Turn a subscriber's queue into an SSE event stream.
///
/// The guard lives inside the stream state, so dropping the stream
/// deregisters the subscriber.
pub fn subscription_stream(
    rx: mpsc::Receiver<String>,
    guard: SubscriptionGuard,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    futures::stream::unfold((rx, guard), |(mut rx, guard)| async move {
        let frame = rx.recv().await?;
        Some((Ok(Event::default().data(frame)), (rx, guard)))
    })
}
