//! Request and response bodies for the realtime endpoints.

use serde::{Deserialize, Serialize};

/// Query string of `GET /api/realtime/events`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeQuery {
    pub client_id: Option<String>,
}

/// Body of `POST /api/realtime/broadcast`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRequest {
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
    /// When set, only this subscriber is targeted.
    pub client_id: Option<String>,
}

/// Body of `GET /api/realtime/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub connected_clients: usize,
}
