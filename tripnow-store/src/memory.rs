//! In-memory reservation store
//!
//! Thread-safe map behind a tokio `RwLock`, used by tests and the
//! development profile.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use tripnow_core::{NewReservation, Reservation, ReservationId, ReservationStatus};

use crate::error::{StoreError, StoreResult};
use crate::{apply_update, ReservationStore};

#[derive(Debug, Default)]
struct Inner {
    reservations: BTreeMap<ReservationId, Reservation>,
    last_id: u64,
}

/// In-memory reservation store
#[derive(Debug, Default)]
pub struct MemoryReservationStore {
    inner: RwLock<Inner>,
}

impl MemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored reservations
    pub async fn len(&self) -> usize {
        self.inner.read().await.reservations.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove everything
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.reservations.clear();
        inner.last_id = 0;
    }
}

#[async_trait]
impl ReservationStore for MemoryReservationStore {
    async fn create(&self, request: NewReservation) -> StoreResult<Reservation> {
        let request = request.validate()?;

        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let reservation = request.into_reservation(ReservationId(inner.last_id), Utc::now());
        inner.reservations.insert(reservation.id, reservation.clone());

        Ok(reservation)
    }

    async fn get(&self, id: ReservationId) -> StoreResult<Option<Reservation>> {
        Ok(self.inner.read().await.reservations.get(&id).cloned())
    }

    async fn list_by_idempotency_key(&self, idempotency_key: &str) -> StoreResult<Vec<Reservation>> {
        let inner = self.inner.read().await;
        Ok(inner
            .reservations
            .values()
            .filter(|r| r.idempotency_key == idempotency_key)
            .cloned()
            .collect())
    }

    async fn list_by_status(&self, status: ReservationStatus, limit: usize) -> StoreResult<Vec<Reservation>> {
        let inner = self.inner.read().await;
        Ok(inner
            .reservations
            .values()
            .filter(|r| r.status == status)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update(&self, reservation: &Reservation) -> StoreResult<Reservation> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .reservations
            .get(&reservation.id)
            .ok_or(StoreError::NotFound(reservation.id))?;

        let updated = apply_update(stored, reservation)?;
        inner.reservations.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: ReservationId, idempotency_key: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let matches = inner
            .reservations
            .get(&id)
            .is_some_and(|r| r.idempotency_key == idempotency_key);

        if matches {
            inner.reservations.remove(&id);
        }
        Ok(matches)
    }
}
