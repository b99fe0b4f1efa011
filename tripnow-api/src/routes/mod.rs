//! API route handlers

pub mod health;
pub mod reservation;

use axum::{routing::get, routing::post, Router};

use crate::state::AppState;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Operational endpoints
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        // Reservation endpoints
        .route("/api/reservations/create", post(reservation::create_reservation))
        .route(
            "/api/reservations/by-idempotency-key/:idempotency_key",
            get(reservation::get_by_idempotency_key),
        )
        .route("/api/reservations/:id", get(reservation::get_reservation))
        .with_state(state)
}
