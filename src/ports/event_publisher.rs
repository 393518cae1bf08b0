//! RealtimePublisher port - Interface for pushing events to connected apps.
//!
//! Write-side services (line and ticket management) depend on this port
//! instead of on the concrete broadcast hub.

use serde::Serialize;

use crate::domain::foundation::ClientId;
use crate::domain::realtime::EventType;

/// Outcome of one fan-out, for logging and tests.
///
/// Publishing never fails from the caller's point of view; subscribers
/// whose write failed are simply counted as evicted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    /// Subscribers the frame was queued for.
    pub delivered: usize,
    /// Subscribers removed because the write failed.
    pub evicted: usize,
}

/// Port for fire-and-forget realtime notifications.
///
/// Implementations must:
/// - Never block on slow subscribers
/// - Never surface per-subscriber failures to the caller
/// - Stamp each event with the publish time
///
/// # Example
///
/// ```ignore
/// publisher.publish(EventType::LineCreated, json!({ "line": line }));
/// ```
pub trait RealtimePublisher: Send + Sync {
    /// Deliver an event to every currently connected subscriber.
    fn publish(&self, event_type: EventType, data: serde_json::Value) -> BroadcastReport;

    /// Deliver an event to one subscriber. Unknown ids are a no-op.
    fn publish_to(
        &self,
        client_id: &ClientId,
        event_type: EventType,
        data: serde_json::Value,
    ) -> BroadcastReport;
}
