//! Health and status endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::api::server::AppState;
use crate::models::BridgeStatus;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "ws-udp-bridge"
        })),
    )
}

/// Relay counters and bound addresses
pub async fn status(State(state): State<AppState>) -> Json<BridgeStatus> {
    Json(BridgeStatus {
        status: "running".to_string(),
        started_at: state.started_at_utc,
        uptime_secs: state.started_at.elapsed().as_secs(),
        ws_addr: state.ws_addr.to_string(),
        udp_addr: state.udp_addr.to_string(),
        target: state.relay.target().to_string(),
        bidirectional: state.bidirectional,
        stats: state.stats.snapshot(state.registry.len()),
    })
}
