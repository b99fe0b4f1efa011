//! Health and metrics endpoints

use axum::{extract::State, http::header, response::IntoResponse, Json};

use tripnow_risk::CircuitState;

use crate::dto::HealthResponse;
use crate::state::AppState;

/// Health check endpoint
///
/// Reports `degraded` while the risk circuit is open.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let circuit = state.risk_client.as_ref().map(|c| c.circuit_state());
    let status = match circuit {
        Some(CircuitState::Open) => "degraded",
        _ => "healthy",
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: state.version.clone(),
        circuit,
    })
}

/// Prometheus metrics endpoint
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let mut body = String::new();
    if let Some(client) = &state.risk_client {
        body.push_str(&client.metrics().prometheus_export());
    }
    if let Some(poller) = &state.poller_metrics {
        body.push_str(&poller.prometheus_export());
    }

    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
