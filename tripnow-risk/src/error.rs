//! Risk client error types

use std::time::Duration;
use thiserror::Error;

/// Failures seen inside the risk policy stack
///
/// None of these reach callers of the resilient client; they are mapped to
/// `FALLBACK` or `ERROR` outcomes by the fallback layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    /// Connection refused, reset, or request timed out
    #[error("Transport error: {0}")]
    Transport(String),

    /// Oracle answered with a non-2xx status
    #[error("Risk oracle returned HTTP {status}")]
    UnsuccessfulStatus { status: u16 },

    /// Body could not be decoded as an evaluation outcome
    #[error("Malformed risk response: {0}")]
    MalformedResponse(String),

    /// The request could not be built or sent at all
    #[error("Local error: {0}")]
    Local(String),

    /// Call rejected without touching the network
    #[error("Circuit open, retry in {retry_in:?}")]
    CircuitOpen { retry_in: Duration },

    /// Overall timeout exceeded
    #[error("Risk evaluation timed out after {0:?}")]
    Timeout(Duration),

    /// Every retry attempt failed
    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetryExhausted { attempts: u32, last_error: String },
}

impl RiskError {
    /// Whether the retry layer should try again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RiskError::Transport(_) | RiskError::UnsuccessfulStatus { .. } | RiskError::MalformedResponse(_)
        )
    }

    /// Local errors bypass retry and breaker accounting
    pub fn is_local(&self) -> bool {
        matches!(self, RiskError::Local(_))
    }

    /// Whether the circuit breaker counts this as a failed call
    pub fn counts_as_failure(&self) -> bool {
        !matches!(self, RiskError::Local(_) | RiskError::CircuitOpen { .. })
    }
}

/// Result type for risk operations
pub type RiskResult<T> = Result<T, RiskError>;
