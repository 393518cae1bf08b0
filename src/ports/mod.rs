//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Server side
//!
//! - `PushChannel` - write half of one subscriber's stream
//! - `RealtimePublisher` - what write-side services call to notify apps
//!
//! ## Client side
//!
//! - `EventStreamTransport` - opens a subscription and yields raw frames

mod event_publisher;
mod event_source;
mod push_channel;

pub use event_publisher::{BroadcastReport, RealtimePublisher};
pub use event_source::{EventStreamTransport, FrameStream, TransportError};
pub use push_channel::{ChannelError, PushChannel};
