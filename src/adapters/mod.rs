//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `realtime` - Broadcast hub and SSE endpoints (server side)
//! - `consumer` - Subscription client with reconnect (client side)
//! - `http` - Shared HTTP plumbing: errors, operator gate, router

pub mod consumer;
pub mod http;
pub mod realtime;

pub use consumer::{EventConsumer, EventHandlers, HttpEventSource, HttpEventSourceConfig};
pub use http::build_router;
pub use realtime::{BroadcastHub, RealtimeState};
