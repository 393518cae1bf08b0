//! HTTP handlers for the realtime endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{
        sse::{KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};

use crate::adapters::http::dto::ApiError;
use crate::config::RealtimeConfig;
use crate::domain::foundation::ClientId;
use crate::domain::realtime::EventType;
use crate::ports::BroadcastReport;

use super::dto::{BroadcastRequest, StatusResponse, SubscribeQuery};
use super::hub::BroadcastHub;
use super::sse_channel::{subscription_stream, SseChannel, SubscriptionGuard};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

/// State shared by the realtime handlers.
#[derive(Clone)]
pub struct RealtimeState {
    pub hub: Arc<BroadcastHub>,
    pub subscriber_buffer: usize,
    pub keep_alive: Duration,
}

impl RealtimeState {
    pub fn new(hub: Arc<BroadcastHub>, config: &RealtimeConfig) -> Self {
        Self {
            hub,
            subscriber_buffer: config.subscriber_buffer,
            keep_alive: config.keep_alive(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/realtime/events - Open an event stream
///
/// Registers the caller with the hub under `?clientId=` (or a generated
/// id) and streams frames until either side closes the connection.
pub async fn subscribe(
    State(state): State<RealtimeState>,
    Query(query): Query<SubscribeQuery>,
) -> Result<Response, ApiError> {
    let client_id = ClientId::from_optional(query.client_id.as_deref())?;

    let (channel, rx) = SseChannel::bounded(state.subscriber_buffer);
    let registration = state.hub.register(client_id, Box::new(channel));
    let guard = SubscriptionGuard::new(state.hub.clone(), registration);

    let sse = Sse::new(subscription_stream(rx, guard))
        .keep_alive(KeepAlive::new().interval(state.keep_alive));

    // Stop reverse proxies from buffering the stream.
    let headers = [(
        HeaderName::from_static("x-accel-buffering"),
        HeaderValue::from_static("no"),
    )];
    Ok((headers, sse).into_response())
}

/// GET /api/realtime/status - Number of connected subscribers
pub async fn status(State(state): State<RealtimeState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        connected_clients: state.hub.connected_count(),
    })
}

/// POST /api/realtime/broadcast - Publish an event by hand (operator only)
pub async fn trigger_broadcast(
    State(state): State<RealtimeState>,
    payload: Result<Json<BroadcastRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BroadcastReport>), ApiError> {
    let Json(req) = payload?;
    let event_type = EventType::parse(&req.event_type)?;

    let report = match req.client_id.as_deref() {
        Some(raw) => {
            let client_id = ClientId::parse(raw)?;
            state.hub.send_to_client(&client_id, event_type.clone(), req.data)
        }
        None => state.hub.broadcast(event_type.clone(), req.data),
    };

    tracing::info!(
        event_type = %event_type,
        delivered = report.delivered,
        evicted = report.evicted,
        "Operator triggered broadcast"
    );

    Ok((StatusCode::ACCEPTED, Json(report)))
}

/// GET /health - Liveness check
pub async fn health() -> &'static str {
    "ok"
}
