//! Data Transfer Objects for API requests and responses

use serde::{Deserialize, Serialize};

use tripnow_core::NewReservation;
use tripnow_risk::CircuitState;

/// Create reservation request
///
/// Missing fields default to empty so they fail validation with a 400
/// instead of a body rejection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateReservationRequest {
    pub customer_email: String,
    pub trip_country: String,
    pub amount: i64,
    pub idempotency_key: String,
}

impl From<CreateReservationRequest> for NewReservation {
    fn from(req: CreateReservationRequest) -> Self {
        NewReservation::new(req.customer_email, req.trip_country, req.amount, req.idempotency_key)
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Risk client circuit, absent when no client is attached
    pub circuit: Option<CircuitState>,
}
