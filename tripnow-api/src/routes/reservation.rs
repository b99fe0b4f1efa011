//! Reservation endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use tripnow_core::{Reservation, ReservationId};

use crate::dto::CreateReservationRequest;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Create a reservation awaiting risk check
///
/// Unreadable bodies are reported as `BAD_REQUEST` in the usual error shape.
pub async fn create_reservation(
    State(state): State<AppState>,
    payload: Result<Json<CreateReservationRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Reservation>)> {
    let Json(req) = payload?;
    let reservation = state.store.create(req.into()).await?;

    info!(reservation_id = %reservation.id, "Reservation created");
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// List reservations created with an idempotency key
pub async fn get_by_idempotency_key(
    State(state): State<AppState>,
    Path(idempotency_key): Path<String>,
) -> ApiResult<Json<Vec<Reservation>>> {
    if idempotency_key.trim().is_empty() {
        return Err(ApiError::BadRequest("Idempotency key is required".to_string()));
    }

    let reservations = state.store.list_by_idempotency_key(&idempotency_key).await?;
    if reservations.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No reservations found for idempotency key {}",
            idempotency_key
        )));
    }

    Ok(Json(reservations))
}

/// Get reservation by ID
pub async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Reservation>> {
    if id == 0 {
        return Err(ApiError::BadRequest("Invalid reservation ID".to_string()));
    }

    let reservation = state
        .store
        .get(ReservationId(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Reservation {} not found", id)))?;

    Ok(Json(reservation))
}
