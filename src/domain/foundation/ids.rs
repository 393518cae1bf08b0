//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ValidationError;

/// Maximum accepted length of a caller-supplied client id.
pub const MAX_CLIENT_ID_LEN: usize = 128;

/// Opaque identifier for one realtime subscriber.
///
/// Either supplied by the client (`?clientId=`) or generated server-side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Generates a new random client id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Validates a caller-supplied id.
    ///
    /// Surrounding whitespace is trimmed. Control characters are rejected
    /// because the id is echoed back inside the event stream.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("clientId"));
        }
        let len = trimmed.chars().count();
        if len > MAX_CLIENT_ID_LEN {
            return Err(ValidationError::too_long("clientId", MAX_CLIENT_ID_LEN, len));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ValidationError::invalid_format(
                "clientId",
                "control characters are not allowed",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Resolves an optional caller-supplied id, generating one when absent or blank.
    pub fn from_optional(raw: Option<&str>) -> Result<Self, ValidationError> {
        match raw.map(str::trim) {
            Some(s) if !s.is_empty() => Self::parse(s),
            _ => Ok(Self::generate()),
        }
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
