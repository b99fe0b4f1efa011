//! Background Poller
//!
//! Periodically lists pending reservations and resolves them one at a
//! time. Nothing escapes the loop: a failed listing or a failed item is
//! logged and retried on the next cycle.
//!
//! Shutdown is observed between items and during the wait between
//! cycles. An item already being resolved always completes, so its
//! score and status are written together.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info};

use tripnow_core::{PollerConfig, ReservationStatus};
use tripnow_risk::RiskEvaluator;
use tripnow_store::ReservationStore;

use crate::error::WorkerResult;
use crate::metrics::PollerMetrics;
use crate::resolver::RiskResolver;

/// Summary of one poll cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Pending reservations found
    pub listed: usize,
    pub approved: usize,
    pub rejected: usize,
    /// Evaluated but inconclusive
    pub still_pending: usize,
    /// Resolution raised an error
    pub failed: usize,
}

impl CycleReport {
    /// Reservations the cycle attempted
    pub fn processed(&self) -> usize {
        self.approved + self.rejected + self.still_pending + self.failed
    }
}

/// Risk poller
pub struct RiskPoller {
    store: Arc<dyn ReservationStore>,
    resolver: RiskResolver,
    config: PollerConfig,
    metrics: Arc<PollerMetrics>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl RiskPoller {
    pub fn new(
        store: Arc<dyn ReservationStore>,
        evaluator: Arc<dyn RiskEvaluator>,
        config: PollerConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            resolver: RiskResolver::new(store.clone(), evaluator),
            store,
            config,
            metrics: Arc::new(PollerMetrics::new()),
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn metrics(&self) -> Arc<PollerMetrics> {
        self.metrics.clone()
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Run a single cycle over the current pending reservations
    ///
    /// Fails only when listing fails; per item failures are counted in
    /// the report.
    pub async fn run_cycle(&self) -> WorkerResult<CycleReport> {
        let pending = self
            .store
            .list_by_status(ReservationStatus::PendingRiskCheck, self.config.limit())
            .await?;

        let mut report = CycleReport {
            listed: pending.len(),
            ..CycleReport::default()
        };

        if pending.is_empty() {
            debug!("No pending reservations");
            return Ok(report);
        }

        info!(count = pending.len(), "Processing pending reservations");

        for reservation in &pending {
            if *self.shutdown_rx.borrow() {
                info!(
                    remaining = pending.len() - report.processed(),
                    "Shutdown requested, ending cycle early"
                );
                break;
            }

            match self.resolver.resolve(reservation).await {
                Ok(resolved) => match resolved.status {
                    ReservationStatus::Approved => report.approved += 1,
                    ReservationStatus::Rejected => report.rejected += 1,
                    ReservationStatus::PendingRiskCheck => report.still_pending += 1,
                },
                Err(e) => {
                    report.failed += 1;
                    error!(
                        reservation_id = %reservation.id,
                        error = %e,
                        "Failed to resolve reservation"
                    );
                }
            }
        }

        Ok(report)
    }

    /// Start the poller in a background task
    pub fn start(self) -> PollerHandle {
        let shutdown_tx = self.shutdown_tx.clone();
        let metrics = self.metrics.clone();

        let handle = tokio::spawn(async move {
            self.run_loop().await;
        });

        PollerHandle {
            shutdown_tx,
            task_handle: handle,
            metrics,
        }
    }

    async fn run_loop(self) {
        let mut shutdown_rx = self.shutdown_rx.clone();
        let interval = self.config.interval();

        info!(
            interval_secs = interval.as_secs(),
            batch_limit = ?self.config.batch_limit,
            "Risk poller started"
        );

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            match self.run_cycle().await {
                Ok(report) => {
                    self.metrics.record_cycle(&report);
                    if report.listed > 0 {
                        info!(
                            listed = report.listed,
                            approved = report.approved,
                            rejected = report.rejected,
                            still_pending = report.still_pending,
                            failed = report.failed,
                            "Poll cycle finished"
                        );
                    }
                }
                Err(e) => {
                    self.metrics.record_cycle_failure();
                    error!(error = %e, "Poll cycle failed");
                }
            }

            let next_cycle = Instant::now() + interval;
            tokio::select! {
                _ = tokio::time::sleep_until(next_cycle) => {}
                _ = wait_for_shutdown(&mut shutdown_rx) => break,
            }
        }

        info!("Risk poller stopped");
    }
}

/// Resolves once shutdown is signalled or the sender is gone
async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// Handle for controlling a running poller
pub struct PollerHandle {
    shutdown_tx: watch::Sender<bool>,
    task_handle: tokio::task::JoinHandle<()>,
    metrics: Arc<PollerMetrics>,
}

impl PollerHandle {
    /// Signal shutdown and wait for the in-flight item to finish
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task_handle.await {
            error!(error = %e, "Risk poller task failed");
        }
    }

    pub fn is_running(&self) -> bool {
        !self.task_handle.is_finished()
    }

    pub fn metrics(&self) -> Arc<PollerMetrics> {
        self.metrics.clone()
    }
}
