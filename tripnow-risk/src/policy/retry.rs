//! Retry layer
//!
//! Re-runs a failed attempt with exponential backoff. Only transport
//! failures, non-success statuses and malformed bodies are retried.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::error::{RiskError, RiskResult};
use crate::metrics::RiskMetrics;

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before retry `n` is `backoff_base_secs^n` seconds
    pub backoff_base_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_secs: 2,
        }
    }
}

/// Retry policy with exponential backoff and no jitter
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    metrics: Arc<RiskMetrics>,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig, metrics: Arc<RiskMetrics>) -> Self {
        Self { config, metrics }
    }

    /// Backoff before retry number `retry` (1-based)
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        Duration::from_secs(self.config.backoff_base_secs.saturating_pow(retry))
    }

    /// Execute `operation`, retrying retryable failures
    pub async fn execute<T, F, Fut>(&self, operation: F) -> RiskResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = RiskResult<T>>,
    {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            self.metrics.record_attempt();

            let error = match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => e,
            };

            if attempt > self.config.max_retries {
                return Err(RiskError::RetryExhausted {
                    attempts: attempt,
                    last_error: error.to_string(),
                });
            }

            let delay = self.delay_for_attempt(attempt);
            warn!(
                attempt,
                max_retries = self.config.max_retries,
                delay_secs = delay.as_secs(),
                error = %error,
                "Risk oracle attempt failed, retrying"
            );
            self.metrics.record_retry();
            tokio::time::sleep(delay).await;
        }
    }
}
