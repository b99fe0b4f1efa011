//! Timeout layer
//!
//! Bounds the whole circuit breaker and retry sequence. When the duration is
//! exceeded the inner future is dropped, which the breaker records as a
//! failed call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::error::{RiskError, RiskResult};
use crate::metrics::RiskMetrics;

#[derive(Debug, Clone)]
pub struct TimeoutPolicy {
    duration: Duration,
    metrics: Arc<RiskMetrics>,
}

impl TimeoutPolicy {
    pub fn new(duration: Duration, metrics: Arc<RiskMetrics>) -> Self {
        Self { duration, metrics }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub async fn execute<T, Fut>(&self, call: Fut) -> RiskResult<T>
    where
        Fut: Future<Output = RiskResult<T>>,
    {
        match tokio::time::timeout(self.duration, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_secs = self.duration.as_secs(), "Risk evaluation timed out");
                self.metrics.record_timeout();
                Err(RiskError::Timeout(self.duration))
            }
        }
    }
}
