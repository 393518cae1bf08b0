//! Realtime domain events pushed to connected clients.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Timestamp, ValidationError};

use super::message::{CONNECTED_TAG, REPLACED_TAG};

/// Type tag of a published domain occurrence.
///
/// The five known tags are the ones the admin dashboard and scanner apps
/// react to. Any other non-empty tag is carried as [`EventType::Other`]; the
/// hub does not restrict what may be published.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EventType {
    LineCreated,
    LineUpdated,
    LineDeleted,
    TicketTypeCreated,
    TicketDeleted,
    Other(String),
}

impl EventType {
    /// All tags the consumer has dedicated callbacks for.
    pub const KNOWN: [EventType; 5] = [
        EventType::LineCreated,
        EventType::LineUpdated,
        EventType::LineDeleted,
        EventType::TicketTypeCreated,
        EventType::TicketDeleted,
    ];

    /// Parses a wire tag. Empty (or whitespace-only) tags and the stream's
    /// own control tags are rejected.
    pub fn parse(tag: &str) -> Result<Self, ValidationError> {
        let tag = tag.trim();
        let parsed = match tag {
            "" => return Err(ValidationError::empty_field("eventType")),
            CONNECTED_TAG | REPLACED_TAG => {
                return Err(ValidationError::invalid_format(
                    "eventType",
                    format!("'{}' is reserved for stream control frames", tag),
                ))
            }
            "line_created" => EventType::LineCreated,
            "line_updated" => EventType::LineUpdated,
            "line_deleted" => EventType::LineDeleted,
            "ticket_type_created" => EventType::TicketTypeCreated,
            "ticket_deleted" => EventType::TicketDeleted,
            other => EventType::Other(other.to_string()),
        };
        Ok(parsed)
    }

    /// Wire representation of the tag.
    pub fn as_str(&self) -> &str {
        match self {
            EventType::LineCreated => "line_created",
            EventType::LineUpdated => "line_updated",
            EventType::LineDeleted => "line_deleted",
            EventType::TicketTypeCreated => "ticket_type_created",
            EventType::TicketDeleted => "ticket_deleted",
            EventType::Other(tag) => tag,
        }
    }

    /// Whether this is one of the five known tags.
    pub fn is_known(&self) -> bool {
        !matches!(self, EventType::Other(_))
    }
}

impl TryFrom<String> for EventType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        EventType::parse(&value)
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        match value {
            EventType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One published domain occurrence.
///
/// `timestamp` is stamped by the hub at publish time, not by the write that
/// caused the event. `data` is opaque to the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl RealtimeEvent {
    /// Creates an event stamped with the current time.
    pub fn new(event_type: EventType, data: serde_json::Value) -> Self {
        Self {
            event_type,
            data,
            timestamp: Timestamp::now(),
        }
    }
}
