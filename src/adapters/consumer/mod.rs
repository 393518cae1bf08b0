//! Consumer adapters - the client side of the realtime channel.
//!
//! - [`consumer`] - `EventConsumer`, subscription lifecycle and dispatch
//! - [`handlers`] - Callback registry
//! - [`reconnect`] - Backoff policy
//! - [`http_source`] - reqwest transport
//! - [`sse_decoder`] - Incremental `text/event-stream` parsing

pub mod consumer;
pub mod handlers;
pub mod http_source;
pub mod reconnect;
pub mod sse_decoder;

pub use consumer::{ConnectionState, ConsumerConfig, ConsumerError, EventConsumer};
pub use handlers::{EventCallback, EventHandlers};
pub use http_source::{HttpEventSource, HttpEventSourceConfig};
pub use reconnect::{Backoff, ReconnectPolicy};
pub use sse_decoder::SseDecoder;
