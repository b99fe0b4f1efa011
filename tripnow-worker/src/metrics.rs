//! Poller metrics

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::poller::CycleReport;

/// Poller counters, cumulative over the process lifetime
#[derive(Debug, Default)]
pub struct PollerMetrics {
    cycles: AtomicU64,
    cycle_failures: AtomicU64,
    processed: AtomicU64,
    approved: AtomicU64,
    rejected: AtomicU64,
    still_pending: AtomicU64,
    item_failures: AtomicU64,
}

impl PollerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a finished cycle into the counters
    pub fn record_cycle(&self, report: &CycleReport) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.processed
            .fetch_add(report.processed() as u64, Ordering::Relaxed);
        self.approved
            .fetch_add(report.approved as u64, Ordering::Relaxed);
        self.rejected
            .fetch_add(report.rejected as u64, Ordering::Relaxed);
        self.still_pending
            .fetch_add(report.still_pending as u64, Ordering::Relaxed);
        self.item_failures
            .fetch_add(report.failed as u64, Ordering::Relaxed);
    }

    /// A cycle that could not list pending reservations
    pub fn record_cycle_failure(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.cycle_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PollerMetricsSnapshot {
        PollerMetricsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            cycle_failures: self.cycle_failures.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            approved: self.approved.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            still_pending: self.still_pending.load(Ordering::Relaxed),
            item_failures: self.item_failures.load(Ordering::Relaxed),
        }
    }

    /// Export in Prometheus text format
    pub fn prometheus_export(&self) -> String {
        let s = self.snapshot();
        let mut output = String::new();

        for (name, help, value) in [
            ("tripnow_poller_cycles_total", "Poll cycles run", s.cycles),
            ("tripnow_poller_cycle_failures_total", "Cycles whose listing failed", s.cycle_failures),
            ("tripnow_poller_processed_total", "Reservations evaluated", s.processed),
            ("tripnow_poller_approved_total", "Reservations approved", s.approved),
            ("tripnow_poller_rejected_total", "Reservations rejected", s.rejected),
            ("tripnow_poller_still_pending_total", "Evaluations left pending", s.still_pending),
            ("tripnow_poller_item_failures_total", "Reservations that failed to resolve", s.item_failures),
        ] {
            output.push_str(&format!(
                "# HELP {} {}\n# TYPE {} counter\n{} {}\n",
                name, help, name, name, value
            ));
        }

        output
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollerMetricsSnapshot {
    pub cycles: u64,
    pub cycle_failures: u64,
    pub processed: u64,
    pub approved: u64,
    pub rejected: u64,
    pub still_pending: u64,
    pub item_failures: u64,
}
