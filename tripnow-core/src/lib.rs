//! TripNow Core
//!
//! Domain model shared by every TripNow crate:
//!
//! - **Reservation**: the durable record screened by the risk pipeline
//! - **ReservationStatus**: `PENDING_RISK_CHECK -> {APPROVED, REJECTED}` state machine
//! - **RiskEvaluationRequest / RiskEvaluationOutcome**: the risk oracle contract
//! - **Configuration**: env-driven settings with `TRIPNOW_` prefix
//! - **Logging**: level conventions and default filter directives

pub mod config;
pub mod error;
pub mod logging;
pub mod state;
pub mod types;

pub use config::{PollerConfig, RiskConfig, StorageConfig, TripNowConfig};
pub use error::{CoreError, CoreResult};
pub use logging::LogLevel;
pub use state::{ensure_resolvable, is_allowed_write, next_status, RiskDecision};
pub use types::{
    NewReservation, Reservation, ReservationId, ReservationStatus, RiskEvaluationOutcome,
    RiskEvaluationRequest, UNKNOWN_TRIP_COUNTRY,
};
