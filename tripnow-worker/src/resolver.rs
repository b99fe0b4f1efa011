//! Risk Resolution Step
//!
//! Evaluates one pending reservation and persists the score and the next
//! status in a single store update.

use std::sync::Arc;
use tracing::{debug, info, instrument};

use tripnow_core::{ensure_resolvable, next_status, Reservation, RiskDecision};
use tripnow_risk::RiskEvaluator;
use tripnow_store::ReservationStore;

use crate::error::WorkerResult;

pub struct RiskResolver {
    store: Arc<dyn ReservationStore>,
    evaluator: Arc<dyn RiskEvaluator>,
}

impl RiskResolver {
    pub fn new(store: Arc<dyn ReservationStore>, evaluator: Arc<dyn RiskEvaluator>) -> Self {
        Self { store, evaluator }
    }

    /// Resolve one reservation
    ///
    /// The score is recorded even when the outcome is inconclusive and the
    /// reservation stays pending. Terminal reservations are refused before
    /// the oracle is called.
    #[instrument(skip(self, reservation), fields(reservation_id = %reservation.id))]
    pub async fn resolve(&self, reservation: &Reservation) -> WorkerResult<Reservation> {
        ensure_resolvable(reservation.status)?;

        let outcome = self.evaluator.assess(&reservation.risk_request()).await;
        let decision = RiskDecision::from_outcome(&outcome);
        let status = next_status(reservation.status, decision)?;

        let mut next = reservation.clone();
        next.status = status;
        next.risk_score = Some(outcome.risk_score);

        let saved = self.store.update(&next).await?;

        if saved.is_pending() {
            debug!(
                outcome = %outcome.status,
                risk_score = outcome.risk_score,
                "Risk outcome inconclusive, reservation stays pending"
            );
        } else {
            info!(
                status = %saved.status,
                risk_score = outcome.risk_score,
                "Reservation resolved"
            );
        }
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::error::WorkerError;
    use tripnow_core::{
        CoreError, NewReservation, ReservationStatus, RiskEvaluationOutcome, RiskEvaluationRequest,
    };
    use tripnow_store::MemoryReservationStore;

    struct FixedEvaluator {
        outcome: RiskEvaluationOutcome,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RiskEvaluator for FixedEvaluator {
        async fn assess(&self, _request: &RiskEvaluationRequest) -> RiskEvaluationOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    async fn setup_counted(
        outcome: RiskEvaluationOutcome,
    ) -> (Arc<MemoryReservationStore>, Arc<FixedEvaluator>, RiskResolver, Reservation) {
        let store = Arc::new(MemoryReservationStore::new());
        let reservation = store
            .create(NewReservation::new("a@x.com", "US", 500, "key-1"))
            .await
            .unwrap();
        let evaluator = Arc::new(FixedEvaluator {
            outcome,
            calls: AtomicUsize::new(0),
        });
        let resolver = RiskResolver::new(store.clone(), evaluator.clone());
        (store, evaluator, resolver, reservation)
    }

    async fn setup(outcome: RiskEvaluationOutcome) -> (Arc<MemoryReservationStore>, RiskResolver, Reservation) {
        let (store, _, resolver, reservation) = setup_counted(outcome).await;
        (store, resolver, reservation)
    }

    #[tokio::test]
    async fn test_approved_outcome() {
        let (store, resolver, reservation) = setup(RiskEvaluationOutcome::new(12.5, "APPROVED")).await;

        let resolved = resolver.resolve(&reservation).await.unwrap();

        assert_eq!(resolved.status, ReservationStatus::Approved);
        assert_eq!(resolved.risk_score, Some(12.5));
        assert_eq!(resolved.created_at, reservation.created_at);
        assert!(resolved.updated_at > reservation.updated_at);
        assert_eq!(store.get(reservation.id).await.unwrap().unwrap(), resolved);
    }

    #[tokio::test]
    async fn test_rejected_outcome() {
        let (_, resolver, reservation) = setup(RiskEvaluationOutcome::new(91.0, "REJECTED")).await;
        let resolved = resolver.resolve(&reservation).await.unwrap();
        assert_eq!(resolved.status, ReservationStatus::Rejected);
    }

    #[tokio::test]
    async fn test_inconclusive_outcomes_keep_pending_with_score() {
        for outcome in [
            RiskEvaluationOutcome::fallback(),
            RiskEvaluationOutcome::error(),
            RiskEvaluationOutcome::new(5.0, "UNKNOWN"),
            RiskEvaluationOutcome::new(5.0, "approved"),
        ] {
            let score = outcome.risk_score;
            let (_, resolver, reservation) = setup(outcome).await;

            let resolved = resolver.resolve(&reservation).await.unwrap();

            assert_eq!(resolved.status, ReservationStatus::PendingRiskCheck);
            assert_eq!(resolved.risk_score, Some(score));
        }
    }

    #[tokio::test]
    async fn test_resolving_twice_is_idempotent() {
        let (store, resolver, reservation) = setup(RiskEvaluationOutcome::new(12.5, "APPROVED")).await;

        let first = resolver.resolve(&reservation).await.unwrap();
        let second = resolver.resolve(&reservation).await.unwrap();

        assert_eq!(first.status, ReservationStatus::Approved);
        assert_eq!(second.status, ReservationStatus::Approved);
        assert_eq!(second.created_at, reservation.created_at);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_terminal_reservation_is_refused_without_oracle_call() {
        let (store, evaluator, resolver, reservation) =
            setup_counted(RiskEvaluationOutcome::new(12.5, "APPROVED")).await;
        let approved = resolver.resolve(&reservation).await.unwrap();
        assert_eq!(evaluator.calls.load(Ordering::SeqCst), 1);

        let result = resolver.resolve(&approved).await;

        assert!(matches!(
            result,
            Err(WorkerError::Transition(CoreError::AlreadyResolved(ReservationStatus::Approved)))
        ));
        assert_eq!(evaluator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.get(reservation.id).await.unwrap().unwrap(), approved);
    }
}
