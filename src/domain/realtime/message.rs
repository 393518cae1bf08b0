//! Wire frames exchanged over the realtime event stream.
//!
//! Every frame is a single JSON object carried in one SSE `data:` field:
//!
//! ```text
//! {"type":"connected","clientId":"<id>"}                       first frame
//! {"type":"<event-type>","data":<payload>,"timestamp":"<ISO>"} every other frame
//! {"type":"replaced","clientId":"<id>"}                        last frame, if superseded
//! ```

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::foundation::{ClientId, ValidationError};

use super::event::RealtimeEvent;

/// Tag of the handshake frame.
pub const CONNECTED_TAG: &str = "connected";

/// Tag of the frame sent to a connection superseded by a newer one with
/// the same client id.
pub const REPLACED_TAG: &str = "replaced";

// ============================================
// Server → Client
// ============================================

/// All frames the hub writes to a subscriber.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ServerMessage {
    /// Handshake acknowledgement, always the first frame.
    Connected(ConnectedMessage),
    /// A published domain event.
    Event(RealtimeEvent),
    /// Final frame to a connection whose id was taken over.
    Replaced(ReplacedMessage),
}

impl ServerMessage {
    /// Serializes the frame to its JSON text.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Sent once when a subscriber is registered, echoing its assigned id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedMessage {
    #[serde(rename = "type")]
    kind: &'static str,
    pub client_id: ClientId,
}

impl ConnectedMessage {
    pub fn new(client_id: ClientId) -> Self {
        Self {
            kind: CONNECTED_TAG,
            client_id,
        }
    }
}

/// Tells a superseded connection not to come back under the same id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacedMessage {
    #[serde(rename = "type")]
    kind: &'static str,
    pub client_id: ClientId,
}

impl ReplacedMessage {
    pub fn new(client_id: ClientId) -> Self {
        Self {
            kind: REPLACED_TAG,
            client_id,
        }
    }
}

// ============================================
// Client-side decoding
// ============================================

/// Reasons an inbound frame is rejected by the consumer.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame is missing field '{0}'")]
    MissingField(&'static str),

    #[error("frame has an invalid field: {0}")]
    Invalid(#[from] ValidationError),
}

/// A decoded frame, as seen by the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    Connected { client_id: ClientId },
    Replaced { client_id: ClientId },
    Event(RealtimeEvent),
}

impl InboundFrame {
    /// Decodes one frame's JSON text.
    pub fn decode(text: &str) -> Result<Self, FrameError> {
        let value: Value = serde_json::from_str(text)?;
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(FrameError::MissingField("type"))?;

        match tag {
            CONNECTED_TAG => {
                return Ok(InboundFrame::Connected {
                    client_id: Self::client_id(&value)?,
                })
            }
            REPLACED_TAG => {
                return Ok(InboundFrame::Replaced {
                    client_id: Self::client_id(&value)?,
                })
            }
            _ => {}
        }

        if value.get("timestamp").is_none() {
            return Err(FrameError::MissingField("timestamp"));
        }
        Ok(InboundFrame::Event(serde_json::from_value(value)?))
    }

    fn client_id(value: &Value) -> Result<ClientId, FrameError> {
        let id = value
            .get("clientId")
            .and_then(Value::as_str)
            .ok_or(FrameError::MissingField("clientId"))?;
        Ok(ClientId::parse(id)?)
    }
}
