//! Route configuration for realtime endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::adapters::http::middleware::{require_operator, OperatorGate};

use super::handlers::{status, subscribe, trigger_broadcast, RealtimeState};

/// Creates the realtime router.
///
/// Routes (relative to where it is nested, normally `/api/realtime`):
/// - `GET /events` - SSE subscription, optional `?clientId=`
/// - `GET /status` - `{"connectedClients": n}`
/// - `POST /broadcast` - manual broadcast, operator token required
pub fn realtime_router(gate: OperatorGate) -> Router<RealtimeState> {
    let operator_routes = Router::new()
        .route("/broadcast", post(trigger_broadcast))
        .route_layer(middleware::from_fn_with_state(gate, require_operator));

    Router::new()
        .route("/events", get(subscribe))
        .route("/status", get(status))
        .merge(operator_routes)
}
