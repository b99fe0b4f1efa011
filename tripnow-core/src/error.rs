//! Core error types

use thiserror::Error;

use crate::types::ReservationStatus;

/// Errors raised by domain validation and state transitions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Reservation input rejected
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transition not allowed by the reservation state machine
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    /// Reservation already reached a terminal status
    #[error("Reservation already resolved as {0}")]
    AlreadyResolved(ReservationStatus),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;
