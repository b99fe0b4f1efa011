//! Reservation state machine
//!
//! ```text
//! PENDING_RISK_CHECK --APPROVED--> APPROVED
//!                    --REJECTED--> REJECTED
//!                    --anything else--> PENDING_RISK_CHECK (retried next cycle)
//! ```
//!
//! Terminal states have no outgoing edges.

use crate::error::{CoreError, CoreResult};
use crate::types::{ReservationStatus, RiskEvaluationOutcome};

/// Decision carried by an oracle outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskDecision {
    Approve,
    Reject,
    /// ERROR, FALLBACK, UNKNOWN or anything unrecognized
    Inconclusive,
}

impl RiskDecision {
    /// Classify an outcome status. Matching is exact.
    pub fn from_outcome(outcome: &RiskEvaluationOutcome) -> Self {
        match outcome.status.as_str() {
            RiskEvaluationOutcome::APPROVED => Self::Approve,
            RiskEvaluationOutcome::REJECTED => Self::Reject,
            _ => Self::Inconclusive,
        }
    }

    /// Status a pending reservation moves to
    pub fn target_status(&self) -> ReservationStatus {
        match self {
            Self::Approve => ReservationStatus::Approved,
            Self::Reject => ReservationStatus::Rejected,
            Self::Inconclusive => ReservationStatus::PendingRiskCheck,
        }
    }
}

/// Refuse reservations that can no longer be resolved
pub fn ensure_resolvable(current: ReservationStatus) -> CoreResult<()> {
    if current.is_terminal() {
        return Err(CoreError::AlreadyResolved(current));
    }
    Ok(())
}

/// Compute the next status for a reservation given a risk decision.
///
/// Only `PendingRiskCheck` reservations may be resolved.
pub fn next_status(current: ReservationStatus, decision: RiskDecision) -> CoreResult<ReservationStatus> {
    let target = decision.target_status();
    if current.is_terminal() {
        return Err(CoreError::InvalidTransition { from: current, to: target });
    }
    Ok(target)
}

/// Whether the store may overwrite `from` with `to`
pub fn is_allowed_write(from: ReservationStatus, to: ReservationStatus) -> bool {
    !from.is_terminal() || from == to
}
