//! TripNow reservation storage
//!
//! Provides the persistence interface the risk pipeline reads pending
//! reservations from and writes decisions to, plus two implementations:
//!
//! - [`MemoryReservationStore`]: `RwLock`-protected map for tests and development
//! - [`SledReservationStore`]: embedded, durable sled database
//!
//! # Update contract
//!
//! - `created_at`, the idempotency key and the business facts always come from
//!   the stored record; callers cannot change them through `update`
//! - `updated_at` strictly increases on every update
//! - score and status are written together in one operation
//! - a terminal status is never overwritten with a different status
//!
//! Updates are last-write-wins otherwise: there is no version check, so two
//! concurrent pollers could overwrite each other's score.

pub mod error;
pub mod memory;
pub mod sled;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use tripnow_core::{NewReservation, Reservation, ReservationId, ReservationStatus};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryReservationStore;
pub use self::sled::SledReservationStore;

/// Reservation storage interface
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Create a pending reservation from a validated request
    async fn create(&self, request: NewReservation) -> StoreResult<Reservation>;

    /// Get a reservation by id
    async fn get(&self, id: ReservationId) -> StoreResult<Option<Reservation>>;

    /// Get a reservation by id, only if it carries the given idempotency key
    async fn get_with_key(&self, id: ReservationId, idempotency_key: &str) -> StoreResult<Option<Reservation>> {
        Ok(self
            .get(id)
            .await?
            .filter(|r| r.idempotency_key == idempotency_key))
    }

    /// List reservations created with an idempotency key
    async fn list_by_idempotency_key(&self, idempotency_key: &str) -> StoreResult<Vec<Reservation>>;

    /// List up to `limit` reservations in a status, ordered by id
    async fn list_by_status(&self, status: ReservationStatus, limit: usize) -> StoreResult<Vec<Reservation>>;

    /// Persist score and status; refreshes `updated_at`, preserves `created_at`
    async fn update(&self, reservation: &Reservation) -> StoreResult<Reservation>;

    /// Delete a reservation matching id and idempotency key
    async fn delete(&self, id: ReservationId, idempotency_key: &str) -> StoreResult<bool>;
}

/// Next `updated_at` for a record last touched at `previous`
///
/// Strictly greater than `previous` even when the wall clock has not moved
/// or has stepped backwards.
pub fn next_updated_at(previous: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + Duration::microseconds(1);
    Utc::now().max(floor)
}

/// Merge the mutable fields of `incoming` into the `stored` record
pub(crate) fn apply_update(stored: &Reservation, incoming: &Reservation) -> StoreResult<Reservation> {
    if !tripnow_core::is_allowed_write(stored.status, incoming.status) {
        return Err(StoreError::Conflict {
            id: stored.id,
            current: stored.status,
            requested: incoming.status,
        });
    }

    let mut updated = stored.clone();
    updated.status = incoming.status;
    updated.risk_score = incoming.risk_score;
    updated.updated_at = next_updated_at(stored.updated_at);
    Ok(updated)
}
