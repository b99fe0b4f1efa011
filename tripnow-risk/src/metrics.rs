//! Risk client metrics
//!
//! Counters for every policy event. Exported as a snapshot for the health
//! endpoint and in Prometheus text format for `/metrics`.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Policy event counters
#[derive(Debug, Default)]
pub struct RiskMetrics {
    calls: AtomicU64,
    attempts: AtomicU64,
    retries: AtomicU64,
    circuit_opens: AtomicU64,
    short_circuits: AtomicU64,
    timeouts: AtomicU64,
    fallbacks: AtomicU64,
    local_errors: AtomicU64,
}

impl RiskMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    /// One outbound request to the oracle
    pub fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_circuit_open(&self) {
        self.circuit_opens.fetch_add(1, Ordering::Relaxed);
    }

    /// Call rejected by an open circuit
    pub fn record_short_circuit(&self) {
        self.short_circuits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_local_error(&self) {
        self.local_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RiskMetricsSnapshot {
        RiskMetricsSnapshot {
            calls: self.calls.load(Ordering::Relaxed),
            attempts: self.attempts.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            circuit_opens: self.circuit_opens.load(Ordering::Relaxed),
            short_circuits: self.short_circuits.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            local_errors: self.local_errors.load(Ordering::Relaxed),
        }
    }

    /// Export in Prometheus text format
    pub fn prometheus_export(&self) -> String {
        let s = self.snapshot();
        let mut output = String::new();

        macro_rules! counter {
            ($name:expr, $help:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} counter\n{} {}\n",
                    $name, $help, $name, $name, $value
                ));
            };
        }

        counter!("tripnow_risk_calls_total", "Risk evaluations requested", s.calls);
        counter!("tripnow_risk_attempts_total", "Requests sent to the risk oracle", s.attempts);
        counter!("tripnow_risk_retries_total", "Retries after a failed attempt", s.retries);
        counter!("tripnow_risk_circuit_opens_total", "Times the circuit opened", s.circuit_opens);
        counter!(
            "tripnow_risk_short_circuits_total",
            "Calls rejected by an open circuit",
            s.short_circuits
        );
        counter!("tripnow_risk_timeouts_total", "Evaluations that timed out", s.timeouts);
        counter!("tripnow_risk_fallbacks_total", "FALLBACK outcomes returned", s.fallbacks);
        counter!("tripnow_risk_local_errors_total", "ERROR outcomes returned", s.local_errors);

        output
    }
}

/// Point-in-time copy of [`RiskMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskMetricsSnapshot {
    pub calls: u64,
    pub attempts: u64,
    pub retries: u64,
    pub circuit_opens: u64,
    pub short_circuits: u64,
    pub timeouts: u64,
    pub fallbacks: u64,
    pub local_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_and_export() {
        let metrics = RiskMetrics::new();
        metrics.record_call();
        metrics.record_attempt();
        metrics.record_attempt();
        metrics.record_retry();
        metrics.record_fallback();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.calls, 1);
        assert_eq!(snapshot.attempts, 2);
        assert_eq!(snapshot.retries, 1);
        assert_eq!(snapshot.fallbacks, 1);
        assert_eq!(snapshot.timeouts, 0);

        let text = metrics.prometheus_export();
        assert!(text.contains("# TYPE tripnow_risk_attempts_total counter"));
        assert!(text.contains("tripnow_risk_attempts_total 2\n"));
        assert!(text.contains("tripnow_risk_local_errors_total 0\n"));
    }
}
