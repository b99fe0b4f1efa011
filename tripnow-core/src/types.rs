//! Reservation and risk evaluation types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// Trip country used when a stored reservation predates the country field
pub const UNKNOWN_TRIP_COUNTRY: &str = "NA";

/// Reservation identifier, assigned by the store at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(pub u64);

impl ReservationId {
    /// Big-endian key bytes, so byte order matches id order
    pub fn to_key(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ReservationId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// Waiting for a risk decision (initial)
    PendingRiskCheck,
    /// Risk oracle approved the reservation (terminal)
    Approved,
    /// Risk oracle rejected the reservation (terminal)
    Rejected,
}

impl ReservationStatus {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingRiskCheck => "PENDING_RISK_CHECK",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Terminal states are never re-processed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl Default for ReservationStatus {
    fn default() -> Self {
        Self::PendingRiskCheck
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A travel reservation screened by the risk pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Store-assigned identifier
    pub id: ReservationId,
    /// Customer email
    pub customer_email: String,
    /// Trip destination country (ISO alpha-2); absent on legacy records
    #[serde(default)]
    pub trip_country: Option<String>,
    /// Amount in whole currency units
    pub amount: i64,
    /// Lifecycle status
    pub status: ReservationStatus,
    /// Latest score observed from the oracle, unset until first evaluation
    pub risk_score: Option<f64>,
    /// Caller-supplied deduplication token
    pub idempotency_key: String,
    /// Set once at creation
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Build the oracle request from the immutable business facts
    pub fn risk_request(&self) -> RiskEvaluationRequest {
        RiskEvaluationRequest {
            customer_email: self.customer_email.clone(),
            trip_country: self
                .trip_country
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(UNKNOWN_TRIP_COUNTRY)
                .to_string(),
            amount: self.amount,
        }
    }

    /// Whether the poller should pick this reservation up
    pub fn is_pending(&self) -> bool {
        self.status == ReservationStatus::PendingRiskCheck
    }
}

/// Input for creating a reservation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReservation {
    pub customer_email: String,
    pub trip_country: String,
    pub amount: i64,
    pub idempotency_key: String,
}

impl NewReservation {
    /// Create a new reservation request
    pub fn new(
        customer_email: impl Into<String>,
        trip_country: impl Into<String>,
        amount: i64,
        idempotency_key: impl Into<String>,
    ) -> Self {
        Self {
            customer_email: customer_email.into(),
            trip_country: trip_country.into(),
            amount,
            idempotency_key: idempotency_key.into(),
        }
    }

    /// Validate and normalize the request
    ///
    /// Emails and keys are trimmed, the country is upper-cased.
    pub fn validate(self) -> CoreResult<Self> {
        let customer_email = self.customer_email.trim().to_string();
        if customer_email.is_empty() || !customer_email.contains('@') {
            return Err(CoreError::Validation(
                "customerEmail must be a valid email address".to_string(),
            ));
        }

        let trip_country = self.trip_country.trim().to_uppercase();
        if trip_country.is_empty() || trip_country.chars().count() > 2 {
            return Err(CoreError::Validation(
                "tripCountry must be a two-letter country code".to_string(),
            ));
        }

        if self.amount <= 0 {
            return Err(CoreError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }

        let idempotency_key = self.idempotency_key.trim().to_string();
        if idempotency_key.is_empty() {
            return Err(CoreError::Validation(
                "idempotencyKey is required".to_string(),
            ));
        }

        Ok(Self {
            customer_email,
            trip_country,
            amount: self.amount,
            idempotency_key,
        })
    }

    /// Materialize a pending reservation with the given id and timestamp
    pub fn into_reservation(self, id: ReservationId, now: DateTime<Utc>) -> Reservation {
        Reservation {
            id,
            customer_email: self.customer_email,
            trip_country: Some(self.trip_country),
            amount: self.amount,
            status: ReservationStatus::PendingRiskCheck,
            risk_score: None,
            idempotency_key: self.idempotency_key,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request body sent to the risk oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskEvaluationRequest {
    pub customer_email: String,
    pub trip_country: String,
    pub amount: i64,
}

impl RiskEvaluationRequest {
    pub fn new(customer_email: impl Into<String>, trip_country: impl Into<String>, amount: i64) -> Self {
        Self {
            customer_email: customer_email.into(),
            trip_country: trip_country.into(),
            amount,
        }
    }
}

/// Result of one risk evaluation, produced and consumed per call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskEvaluationOutcome {
    pub risk_score: f64,
    pub status: String,
}

impl RiskEvaluationOutcome {
    pub const APPROVED: &'static str = "APPROVED";
    pub const REJECTED: &'static str = "REJECTED";
    pub const ERROR: &'static str = "ERROR";
    pub const FALLBACK: &'static str = "FALLBACK";
    pub const UNKNOWN: &'static str = "UNKNOWN";

    pub fn new(risk_score: f64, status: impl Into<String>) -> Self {
        Self {
            risk_score,
            status: status.into(),
        }
    }

    /// Synthetic outcome used when the policy stack gives up
    pub fn fallback() -> Self {
        Self::new(0.0, Self::FALLBACK)
    }

    /// Synthetic outcome for local failures that bypass the policy stack
    pub fn error() -> Self {
        Self::new(0.0, Self::ERROR)
    }

    pub fn is_fallback(&self) -> bool {
        self.status == Self::FALLBACK
    }

    pub fn is_error(&self) -> bool {
        self.status == Self::ERROR
    }
}
