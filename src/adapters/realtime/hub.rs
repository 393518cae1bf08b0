//! Broadcast hub: registry of connected subscribers and event fan-out.
//!
//! # Architecture
//!
//! ```text
//! ClientId → Subscriber { sequence, channel }
//!   admin-dashboard → #3, SseChannel
//!   scanner-07      → #5, SseChannel
//!   6f1c…           → #6, SseChannel
//! ```
//!
//! Every write is a non-blocking `PushChannel::push`. A failed write evicts
//! the subscriber; it never interrupts the fan-out or reaches the caller.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::foundation::ClientId;
use crate::domain::realtime::{
    ConnectedMessage, EventType, RealtimeEvent, ReplacedMessage, ServerMessage,
};
use crate::ports::{BroadcastReport, PushChannel, RealtimePublisher};

/// One registered connection.
struct Subscriber {
    /// Distinguishes successive connections that reuse the same client id.
    sequence: u64,
    channel: Box<dyn PushChannel>,
}

/// Handle identifying one registration, used to deregister it precisely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub client_id: ClientId,
    pub sequence: u64,
}

/// Registry of live subscribers and the single publish entry point.
///
/// Construct once per process and share it as `Arc<BroadcastHub>`.
///
/// # Thread Safety
///
/// The registry sits behind a `RwLock`: fan-outs take the read lock and
/// only evictions, registrations and disconnects take the write lock. The
/// lock is never held across an `.await`.
pub struct BroadcastHub {
    subscribers: RwLock<HashMap<ClientId, Subscriber>>,
    next_sequence: AtomicU64,
}

impl BroadcastHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_sequence: AtomicU64::new(1),
        }
    }

    /// Register a subscriber and send it the `connected` acknowledgement.
    ///
    /// If `client_id` is already registered, the new channel takes its place.
    /// The previous channel gets a final `replaced` frame and is dropped, so
    /// its stream ends and its consumer stops instead of reconnecting. If
    /// the acknowledgement cannot be written the subscriber is not kept.
    ///
    /// The returned [`Registration`] must be passed to
    /// [`deregister`](Self::deregister) when the transport closes.
    pub fn register(&self, client_id: ClientId, channel: Box<dyn PushChannel>) -> Registration {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        let registration = Registration {
            client_id: client_id.clone(),
            sequence,
        };

        let ack = ServerMessage::Connected(ConnectedMessage::new(client_id.clone()));
        let frame = match ack.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(client_id = %client_id, "Failed to serialize handshake: {}", e);
                return registration;
            }
        };

        // The ack is queued before the subscriber becomes visible to
        // broadcasts, so it is always the first frame on the stream.
        if let Err(e) = channel.push(&frame) {
            tracing::debug!(client_id = %client_id, "Handshake write failed: {}", e);
            return registration;
        }

        let previous = self
            .write()
            .insert(client_id.clone(), Subscriber { sequence, channel });

        if let Some(previous) = previous {
            Self::retire(&client_id, previous);
        }
        tracing::info!(client_id = %client_id, sequence, "Realtime client connected");

        registration
    }

    /// Remove a registration when its transport closes.
    ///
    /// Only removes the entry if it still belongs to this registration, so a
    /// late close of a replaced connection cannot evict its successor.
    /// Returns whether an entry was removed.
    pub fn deregister(&self, registration: &Registration) -> bool {
        let mut subscribers = self.write();
        let owned = subscribers
            .get(&registration.client_id)
            .is_some_and(|s| s.sequence == registration.sequence);

        if owned {
            subscribers.remove(&registration.client_id);
            tracing::info!(client_id = %registration.client_id, "Realtime client disconnected");
        }
        owned
    }

    /// Publish an event to every registered subscriber.
    ///
    /// Each subscriber registered at the time of the call gets exactly one
    /// delivery attempt. Subscribers whose write fails are removed; the rest
    /// of the fan-out is unaffected. Never fails.
    pub fn broadcast(&self, event_type: EventType, data: serde_json::Value) -> BroadcastReport {
        let event = RealtimeEvent::new(event_type, data);
        let Some(frame) = Self::encode(&event) else {
            return BroadcastReport::default();
        };

        let mut failed = Vec::new();
        let mut delivered = 0;
        {
            let subscribers = self.read();
            for (client_id, subscriber) in subscribers.iter() {
                match subscriber.channel.push(&frame) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::debug!(
                            client_id = %client_id,
                            event_type = %event.event_type,
                            "Delivery failed, evicting subscriber: {}",
                            e
                        );
                        failed.push(Registration {
                            client_id: client_id.clone(),
                            sequence: subscriber.sequence,
                        });
                    }
                }
            }
        }

        let evicted = self.evict(&failed);
        tracing::debug!(
            event_type = %event.event_type,
            delivered,
            evicted,
            "Broadcast realtime event"
        );

        BroadcastReport { delivered, evicted }
    }

    /// Publish an event to a single subscriber.
    ///
    /// Unknown ids are a silent no-op. A failed write evicts the subscriber.
    pub fn send_to_client(
        &self,
        client_id: &ClientId,
        event_type: EventType,
        data: serde_json::Value,
    ) -> BroadcastReport {
        let event = RealtimeEvent::new(event_type, data);
        let Some(frame) = Self::encode(&event) else {
            return BroadcastReport::default();
        };

        let failed = {
            let subscribers = self.read();
            let Some(subscriber) = subscribers.get(client_id) else {
                tracing::trace!(client_id = %client_id, "Targeted send to unknown client ignored");
                return BroadcastReport::default();
            };

            match subscriber.channel.push(&frame) {
                Ok(()) => {
                    return BroadcastReport {
                        delivered: 1,
                        evicted: 0,
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        client_id = %client_id,
                        "Targeted delivery failed, evicting subscriber: {}",
                        e
                    );
                    Registration {
                        client_id: client_id.clone(),
                        sequence: subscriber.sequence,
                    }
                }
            }
        };

        BroadcastReport {
            delivered: 0,
            evicted: self.evict(std::slice::from_ref(&failed)),
        }
    }

    /// Drop every subscriber, ending their streams. Used on shutdown.
    pub fn close_all(&self) -> usize {
        let closed = {
            let mut subscribers = self.write();
            let count = subscribers.len();
            subscribers.clear();
            count
        };
        if closed > 0 {
            tracing::info!(closed, "Closed all realtime subscribers");
        }
        closed
    }

    /// Number of currently registered subscribers.
    pub fn connected_count(&self) -> usize {
        self.read().len()
    }

    /// Whether a subscriber with this id is registered.
    pub fn is_connected(&self, client_id: &ClientId) -> bool {
        self.read().contains_key(client_id)
    }

    /// Tell a superseded subscriber it was replaced, then drop its channel.
    fn retire(client_id: &ClientId, previous: Subscriber) {
        let notice = ServerMessage::Replaced(ReplacedMessage::new(client_id.clone()));
        let delivered = notice
            .to_frame()
            .ok()
            .is_some_and(|frame| previous.channel.push(&frame).is_ok());
        tracing::info!(
            client_id = %client_id,
            replaced_sequence = previous.sequence,
            notified = delivered,
            "Client id taken over by a new connection, closing previous channel"
        );
    }

    fn evict(&self, failed: &[Registration]) -> usize {
        if failed.is_empty() {
            return 0;
        }
        failed.iter().filter(|r| self.deregister(r)).count()
    }

    fn encode(event: &RealtimeEvent) -> Option<String> {
        match ServerMessage::Event(event.clone()).to_frame() {
            Ok(frame) => Some(frame),
            Err(e) => {
                tracing::error!(event_type = %event.event_type, "Failed to serialize event: {}", e);
                None
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ClientId, Subscriber>> {
        self.subscribers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ClientId, Subscriber>> {
        self.subscribers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimePublisher for BroadcastHub {
    fn publish(&self, event_type: EventType, data: serde_json::Value) -> BroadcastReport {
        self.broadcast(event_type, data)
    }

    fn publish_to(
        &self,
        client_id: &ClientId,
        event_type: EventType,
        data: serde_json::Value,
    ) -> BroadcastReport {
        self.send_to_client(client_id, event_type, data)
    }
}
