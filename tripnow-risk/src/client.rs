//! Resilient Risk Client
//!
//! Wraps a [`RiskOracle`] in the composed policy stack. `evaluate` never
//! fails: every failure resolves to a `FALLBACK` or `ERROR` outcome.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

use tripnow_core::{RiskConfig, RiskEvaluationOutcome, RiskEvaluationRequest};

use crate::metrics::RiskMetrics;
use crate::oracle::{HttpRiskOracle, RiskOracle};
use crate::policy::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, FallbackPolicy, RetryConfig, RetryPolicy,
    TimeoutPolicy,
};
use crate::RiskEvaluator;

/// Risk client with retry, circuit breaker, timeout and fallback
pub struct ResilientRiskClient {
    oracle: Arc<dyn RiskOracle>,
    retry: RetryPolicy,
    breaker: CircuitBreaker,
    timeout: TimeoutPolicy,
    fallback: FallbackPolicy,
    metrics: Arc<RiskMetrics>,
}

impl ResilientRiskClient {
    /// Create a client around an arbitrary oracle
    pub fn new(oracle: Arc<dyn RiskOracle>, config: &RiskConfig) -> Self {
        let metrics = Arc::new(RiskMetrics::new());

        Self {
            oracle,
            retry: RetryPolicy::new(
                RetryConfig {
                    max_retries: config.max_retries,
                    backoff_base_secs: config.backoff_base_secs,
                },
                metrics.clone(),
            ),
            breaker: CircuitBreaker::new(
                CircuitBreakerConfig {
                    failure_threshold: config.breaker_failure_threshold,
                    open_duration: config.breaker_open_duration(),
                },
                metrics.clone(),
            ),
            timeout: TimeoutPolicy::new(config.timeout(), metrics.clone()),
            fallback: FallbackPolicy::new(metrics.clone()),
            metrics,
        }
    }

    /// Create a client talking HTTP to the configured oracle URL
    pub fn from_config(config: &RiskConfig) -> Self {
        Self::new(Arc::new(HttpRiskOracle::from_config(config)), config)
    }

    /// Evaluate a reservation's risk
    pub async fn evaluate(
        &self,
        customer_email: &str,
        trip_country: &str,
        amount: i64,
    ) -> RiskEvaluationOutcome {
        self.evaluate_request(&RiskEvaluationRequest::new(customer_email, trip_country, amount))
            .await
    }

    /// Evaluate a prepared request through the full policy stack
    #[instrument(skip(self, request), fields(country = %request.trip_country, amount = request.amount))]
    pub async fn evaluate_request(&self, request: &RiskEvaluationRequest) -> RiskEvaluationOutcome {
        self.metrics.record_call();

        let oracle = &self.oracle;
        let outcome = self
            .fallback
            .execute(self.timeout.execute(self.breaker.execute(|| {
                self.retry.execute(|| oracle.evaluate(request))
            })))
            .await;

        debug!(status = %outcome.status, risk_score = outcome.risk_score, "Risk evaluation finished");
        outcome
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    pub fn metrics(&self) -> &Arc<RiskMetrics> {
        &self.metrics
    }
}

#[async_trait]
impl RiskEvaluator for ResilientRiskClient {
    async fn assess(&self, request: &RiskEvaluationRequest) -> RiskEvaluationOutcome {
        self.evaluate_request(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RiskError;
    use crate::oracle::{MockReply, MockRiskOracle};
    use std::time::Duration;
    use tokio::time::Instant;

    fn client(oracle: Arc<MockRiskOracle>) -> ResilientRiskClient {
        ResilientRiskClient::new(oracle, &RiskConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_passes_oracle_outcome_through() {
        let oracle = Arc::new(MockRiskOracle::approving(12.5));
        let client = client(oracle.clone());

        let outcome = client.evaluate("a@x.com", "US", 500).await;

        assert_eq!(outcome, RiskEvaluationOutcome::new(12.5, "APPROVED"));
        assert_eq!(oracle.call_count(), 1);
        assert_eq!(oracle.requests()[0], RiskEvaluationRequest::new("a@x.com", "US", 500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_failure() {
        let oracle = Arc::new(MockRiskOracle::approving(1.0));
        oracle.push(MockReply::Fail(RiskError::UnsuccessfulStatus { status: 503 }));
        let client = client(oracle.clone());
        let start = Instant::now();

        let outcome = client.evaluate("a@x.com", "US", 500).await;

        assert_eq!(outcome.status, "APPROVED");
        assert_eq!(oracle.call_count(), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
        assert_eq!(client.circuit_state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_oracle_falls_back() {
        let oracle = Arc::new(MockRiskOracle::unreachable());
        let client = client(oracle.clone());

        let outcome = client.evaluate("a@x.com", "US", 500).await;

        assert_eq!(outcome, RiskEvaluationOutcome::fallback());
        assert!(oracle.call_count() >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_circuit_skips_network() {
        let oracle = Arc::new(MockRiskOracle::unreachable());
        let client = client(oracle.clone());

        for _ in 0..3 {
            assert!(client.evaluate("a@x.com", "US", 500).await.is_fallback());
        }
        assert_eq!(client.circuit_state(), CircuitState::Open);
        let calls_before = oracle.call_count();

        let outcome = client.evaluate("a@x.com", "US", 500).await;

        assert_eq!(outcome, RiskEvaluationOutcome::fallback());
        assert_eq!(oracle.call_count(), calls_before);
        assert_eq!(client.metrics().snapshot().short_circuits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_circuit_recovers_after_open_window() {
        let oracle = Arc::new(MockRiskOracle::unreachable());
        let client = client(oracle.clone());
        for _ in 0..3 {
            client.evaluate("a@x.com", "US", 500).await;
        }

        oracle.set_default(MockReply::Outcome(RiskEvaluationOutcome::new(2.0, "REJECTED")));
        tokio::time::advance(Duration::from_secs(30)).await;

        let outcome = client.evaluate("a@x.com", "US", 500).await;
        assert_eq!(outcome.status, "REJECTED");
        assert_eq!(client.circuit_state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_oracle_times_out() {
        let oracle = Arc::new(MockRiskOracle::hanging());
        let client = client(oracle.clone());
        let start = Instant::now();

        let outcome = client.evaluate("a@x.com", "US", 500).await;

        assert_eq!(outcome, RiskEvaluationOutcome::fallback());
        assert_eq!(start.elapsed(), Duration::from_secs(10));
        assert_eq!(oracle.call_count(), 1);
        assert_eq!(client.metrics().snapshot().timeouts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_error_returns_error_outcome() {
        let oracle = Arc::new(MockRiskOracle::always(MockReply::Fail(RiskError::Local(
            "cannot serialize".into(),
        ))));
        let client = client(oracle.clone());

        for _ in 0..5 {
            let outcome = client.evaluate("a@x.com", "US", 500).await;
            assert_eq!(outcome, RiskEvaluationOutcome::error());
        }
        assert_eq!(oracle.call_count(), 5);
        assert_eq!(client.circuit_state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_invalid_url_returns_error_outcome() {
        let client = ResilientRiskClient::from_config(&RiskConfig::default().with_url("::nope"));

        let outcome = client.evaluate("a@x.com", "US", 500).await;

        assert_eq!(outcome, RiskEvaluationOutcome::error());
        assert_eq!(client.metrics().snapshot().attempts, 1);
    }
}
