//! Server-Sent Events adapters for pushing realtime updates to apps.
//!
//! Every connected app (admin dashboard, scanner and validator apps) holds one SSE
//! stream. The hub fans each published event out to all of them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │              Publishers (operator trigger, in-process code)          │
//! │   POST /api/realtime/broadcast  │  RealtimePublisher::publish       │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ broadcast / send_to_client
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         BroadcastHub                                 │
//! │   client-a ── SseChannel    client-b ── SseChannel    ...           │
//! │   - first frame to each subscriber is the `connected` handshake     │
//! │   - failed pushes evict the subscriber                              │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ bounded mpsc per subscriber
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │              GET /api/realtime/events  (axum Sse)                    │
//! │   SubscriptionGuard deregisters when the response is dropped        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`hub`] - Subscriber registry and fan-out
//! - [`sse_channel`] - Channel and stream plumbing for one SSE response
//! - [`handlers`] - Axum handlers for the realtime endpoints
//! - [`routes`] - Router wiring, operator gate included

pub mod dto;
pub mod handlers;
pub mod hub;
pub mod routes;
pub mod sse_channel;

pub use dto::{BroadcastRequest, StatusResponse, SubscribeQuery};
pub use handlers::{health, status, subscribe, trigger_broadcast, RealtimeState};
pub use hub::{BroadcastHub, Registration};
pub use routes::realtime_router;
pub use sse_channel::{subscription_stream, SseChannel, SubscriptionGuard};
