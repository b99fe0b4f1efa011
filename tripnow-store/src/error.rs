//! Storage error types

use thiserror::Error;
use tripnow_core::{CoreError, ReservationId, ReservationStatus};

/// Reservation store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// No reservation with this id
    #[error("Reservation not found: {0}")]
    NotFound(ReservationId),

    /// Update would move a terminal reservation to another status
    #[error("Reservation {id} is {current}, refusing to set {requested}")]
    Conflict {
        id: ReservationId,
        current: ReservationStatus,
        requested: ReservationStatus,
    },

    /// Invalid reservation input
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// Backend failure
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Store result type
pub type StoreResult<T> = Result<T, StoreError>;

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<::sled::Error> for StoreError {
    fn from(e: ::sled::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}
