//! Realtime module - events pushed from the backend to connected apps.
//!
//! Defines the event vocabulary (line and ticket-type changes) and the
//! JSON frames the broadcast hub writes and the consumer reads.

mod event;
mod message;

pub use event::{EventType, RealtimeEvent};
pub use message::{
    ConnectedMessage, FrameError, InboundFrame, ReplacedMessage, ServerMessage, CONNECTED_TAG,
    REPLACED_TAG,
};
