//! Circuit breaker layer
//!
//! Counts consecutive failed calls. At the threshold the circuit opens and
//! every call is rejected without touching the oracle until the open window
//! elapses. The next call then runs as a single half-open probe: success
//! closes the circuit, failure opens it for another window.
//!
//! A call dropped before completing (the outer timeout firing) counts as a
//! failure. Local errors neither count nor reset the failure streak.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::error::{RiskError, RiskResult};
use crate::metrics::RiskMetrics;

/// Circuit breaker configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failed calls that open the circuit
    pub failure_threshold: u32,
    /// How long the circuit stays open
    pub open_duration: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            open_duration: Duration::from_secs(30),
        }
    }
}

/// Externally visible circuit state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    Closed { failures: u32 },
    Open { until: Instant },
    HalfOpen { probing: bool },
}

/// Consecutive-failure circuit breaker
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: Mutex<State>,
    metrics: Arc<RiskMetrics>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig, metrics: Arc<RiskMetrics>) -> Self {
        Self {
            config,
            state: Mutex::new(State::Closed { failures: 0 }),
            metrics,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current state; an open circuit whose window elapsed reports half-open
    pub fn state(&self) -> CircuitState {
        match *self.lock() {
            State::Closed { .. } => CircuitState::Closed,
            State::Open { until } if Instant::now() >= until => CircuitState::HalfOpen,
            State::Open { .. } => CircuitState::Open,
            State::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }

    /// Execute `operation` if the circuit admits it
    pub async fn execute<T, F, Fut>(&self, operation: F) -> RiskResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RiskResult<T>>,
    {
        let mut permit = self.acquire()?;
        let result = operation().await;

        match &result {
            Ok(_) => permit.settle(Settlement::Success),
            Err(e) if e.counts_as_failure() => permit.settle(Settlement::Failure),
            Err(_) => permit.settle(Settlement::Neutral),
        }
        result
    }

    fn acquire(&self) -> RiskResult<CallPermit<'_>> {
        let mut state = self.lock();
        let now = Instant::now();
        let current = *state;

        match current {
            State::Closed { .. } => {}
            State::Open { until } if now >= until => {
                debug!("Circuit half-open, sending probe");
                *state = State::HalfOpen { probing: true };
            }
            State::Open { until } => {
                self.metrics.record_short_circuit();
                return Err(RiskError::CircuitOpen {
                    retry_in: until - now,
                });
            }
            State::HalfOpen { probing: true } => {
                self.metrics.record_short_circuit();
                return Err(RiskError::CircuitOpen {
                    retry_in: Duration::ZERO,
                });
            }
            State::HalfOpen { probing: false } => {
                *state = State::HalfOpen { probing: true };
            }
        }

        Ok(CallPermit {
            breaker: self,
            settled: false,
        })
    }

    fn on_success(&self) {
        let mut state = self.lock();
        if !matches!(*state, State::Closed { .. }) {
            info!("Circuit closed");
        }
        *state = State::Closed { failures: 0 };
    }

    fn on_failure(&self) {
        let mut state = self.lock();
        let current = *state;
        match current {
            State::Closed { failures } => {
                let failures = failures + 1;
                if failures >= self.config.failure_threshold {
                    self.open(&mut *state, failures);
                } else {
                    *state = State::Closed { failures };
                }
            }
            State::HalfOpen { .. } => self.open(&mut *state, 1),
            State::Open { .. } => {}
        }
    }

    fn on_neutral(&self) {
        let mut state = self.lock();
        if let State::HalfOpen { .. } = *state {
            *state = State::HalfOpen { probing: false };
        }
    }

    fn open(&self, state: &mut State, failures: u32) {
        error!(
            failures,
            open_secs = self.config.open_duration.as_secs(),
            "Circuit opened"
        );
        self.metrics.record_circuit_open();
        *state = State::Open {
            until: Instant::now() + self.config.open_duration,
        };
    }
}

enum Settlement {
    Success,
    Failure,
    Neutral,
}

/// Admission for one call; dropping it unsettled records a failure
struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    settled: bool,
}

impl CallPermit<'_> {
    fn settle(&mut self, settlement: Settlement) {
        self.settled = true;
        match settlement {
            Settlement::Success => self.breaker.on_success(),
            Settlement::Failure => self.breaker.on_failure(),
            Settlement::Neutral => self.breaker.on_neutral(),
        }
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            debug!("Risk call cancelled before completion");
            self.breaker.on_failure();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig::default(), Arc::new(RiskMetrics::new()))
    }

    async fn fail(breaker: &CircuitBreaker, calls: &AtomicU32) -> RiskResult<()> {
        breaker
            .execute(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(RiskError::UnsuccessfulStatus { status: 500 })
            })
            .await
    }

    async fn succeed(breaker: &CircuitBreaker, calls: &AtomicU32) -> RiskResult<()> {
        breaker
            .execute(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_opens_after_threshold() {
        let breaker = breaker();
        let calls = AtomicU32::new(0);

        for _ in 0..3 {
            assert!(fail(&breaker, &calls).await.is_err());
        }
        assert_eq!(breaker.state(), CircuitState::Open);

        let result = succeed(&breaker, &calls).await;
        assert!(matches!(result, Err(RiskError::CircuitOpen { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(breaker.metrics.snapshot().short_circuits, 1);
        assert_eq!(breaker.metrics.snapshot().circuit_opens, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_streak() {
        let breaker = breaker();
        let calls = AtomicU32::new(0);

        fail(&breaker, &calls).await.ok();
        fail(&breaker, &calls).await.ok();
        succeed(&breaker, &calls).await.unwrap();
        fail(&breaker, &calls).await.ok();
        fail(&breaker, &calls).await.ok();

        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_probe_closes() {
        let breaker = breaker();
        let calls = AtomicU32::new(0);
        for _ in 0..3 {
            fail(&breaker, &calls).await.ok();
        }

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(breaker.state(), CircuitState::HalfOpen);

        succeed(&breaker, &calls).await.unwrap();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_probe_failure_reopens() {
        let breaker = breaker();
        let calls = AtomicU32::new(0);
        for _ in 0..3 {
            fail(&breaker, &calls).await.ok();
        }

        tokio::time::advance(Duration::from_secs(31)).await;
        fail(&breaker, &calls).await.ok();
        assert_eq!(breaker.state(), CircuitState::Open);

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(matches!(
            succeed(&breaker, &calls).await,
            Err(RiskError::CircuitOpen { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_admits_single_trial_call() {
        let breaker = breaker();
        let calls = AtomicU32::new(0);
        for _ in 0..3 {
            fail(&breaker, &calls).await.ok();
        }
        let short_circuits = breaker.metrics.snapshot().short_circuits;

        tokio::time::advance(Duration::from_secs(30)).await;

        let trial = breaker.execute(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok(())
        });
        let concurrent = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            succeed(&breaker, &calls).await
        };
        let (trial, concurrent) = tokio::join!(trial, concurrent);

        assert_eq!(trial, Ok(()));
        assert!(matches!(concurrent, Err(RiskError::CircuitOpen { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(breaker.metrics.snapshot().short_circuits, short_circuits + 1);
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_call_counts_as_failure() {
        let breaker = breaker();

        for _ in 0..3 {
            let call = breaker.execute(|| std::future::pending::<RiskResult<()>>());
            assert!(tokio::time::timeout(Duration::from_secs(10), call).await.is_err());
        }

        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_errors_are_neutral() {
        let breaker = breaker();
        for _ in 0..5 {
            let result: RiskResult<()> = breaker
                .execute(|| async { Err(RiskError::Local("bad url".into())) })
                .await;
            assert!(matches!(result, Err(RiskError::Local(_))));
        }
        assert_eq!(breaker.state(), CircuitState::Closed);
    }
}
