//! TripNow Risk Client
//!
//! Outbound access to the external risk-scoring oracle:
//!
//! - [`RiskOracle`]: one raw call, HTTP or scripted mock
//! - [`policy`]: retry, circuit breaker, timeout and fallback layers
//! - [`ResilientRiskClient`]: the layers composed around an oracle
//! - [`RiskMetrics`]: policy event counters

pub mod client;
pub mod error;
pub mod metrics;
pub mod oracle;
pub mod policy;

use async_trait::async_trait;

use tripnow_core::{RiskEvaluationOutcome, RiskEvaluationRequest};

pub use client::ResilientRiskClient;
pub use error::{RiskError, RiskResult};
pub use metrics::{RiskMetrics, RiskMetricsSnapshot};
pub use oracle::{HttpRiskOracle, MockReply, MockRiskOracle, RiskOracle};
pub use policy::CircuitState;

/// Infallible risk assessment as seen by the resolution step
#[async_trait]
pub trait RiskEvaluator: Send + Sync {
    async fn assess(&self, request: &RiskEvaluationRequest) -> RiskEvaluationOutcome;
}
