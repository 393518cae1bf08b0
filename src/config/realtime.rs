//! Realtime broadcast configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Shortest operator token accepted.
pub const MIN_OPERATOR_TOKEN_LEN: usize = 16;

/// Settings for the broadcast hub and its HTTP surface
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Frames buffered per subscriber before it is considered stalled
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,

    /// Interval between SSE keep-alive comments, in seconds
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// Bearer token guarding the manual broadcast endpoint
    pub operator_token: Option<Secret<String>>,
}

impl RealtimeConfig {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    /// Validate realtime configuration
    ///
    /// The operator token is mandatory in production; elsewhere the
    /// broadcast endpoint is simply disabled without one.
    pub fn validate(&self, is_production: bool) -> Result<(), ValidationError> {
        if self.subscriber_buffer == 0 || self.subscriber_buffer > 4096 {
            return Err(ValidationError::InvalidSubscriberBuffer);
        }
        if self.keep_alive_secs == 0 || self.keep_alive_secs > 300 {
            return Err(ValidationError::InvalidKeepAlive);
        }
        match &self.operator_token {
            Some(token) if token.expose_secret().len() < MIN_OPERATOR_TOKEN_LEN => Err(
                ValidationError::OperatorTokenTooShort(MIN_OPERATOR_TOKEN_LEN),
            ),
            None if is_production => Err(ValidationError::MissingRequired("realtime.operator_token")),
            _ => Ok(()),
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            subscriber_buffer: default_subscriber_buffer(),
            keep_alive_secs: default_keep_alive_secs(),
            operator_token: None,
        }
    }
}

fn default_subscriber_buffer() -> usize {
    128
}

fn default_keep_alive_secs() -> u64 {
    15
}
