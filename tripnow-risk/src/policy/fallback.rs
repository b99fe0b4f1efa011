//! Fallback layer
//!
//! Outermost layer: turns every failure into a well-formed outcome.
//! Local failures become `ERROR`, everything else `FALLBACK`.

use std::future::Future;
use std::sync::Arc;
use tracing::warn;

use tripnow_core::RiskEvaluationOutcome;

use crate::error::RiskResult;
use crate::metrics::RiskMetrics;

#[derive(Debug, Clone)]
pub struct FallbackPolicy {
    metrics: Arc<RiskMetrics>,
}

impl FallbackPolicy {
    pub fn new(metrics: Arc<RiskMetrics>) -> Self {
        Self { metrics }
    }

    pub async fn execute<Fut>(&self, call: Fut) -> RiskEvaluationOutcome
    where
        Fut: Future<Output = RiskResult<RiskEvaluationOutcome>>,
    {
        match call.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_local() => {
                warn!(error = %e, "Risk evaluation failed locally, returning error outcome");
                self.metrics.record_local_error();
                RiskEvaluationOutcome::error()
            }
            Err(e) => {
                warn!(error = %e, "Risk evaluation failed, using fallback outcome");
                self.metrics.record_fallback();
                RiskEvaluationOutcome::fallback()
            }
        }
    }
}
