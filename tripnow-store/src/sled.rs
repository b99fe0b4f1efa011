//! Sled persistent reservation store
//!
//! Reservations are stored as JSON values keyed by the big-endian id, so tree
//! iteration order is id order.

use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, error};

use tripnow_core::{NewReservation, Reservation, ReservationId, ReservationStatus, StorageConfig};

use crate::error::{StoreError, StoreResult};
use crate::{apply_update, ReservationStore};

const RESERVATIONS_TREE: &str = "reservations";

/// Sled-backed reservation store
#[derive(Debug)]
pub struct SledReservationStore {
    db: sled::Db,
    reservations: sled::Tree,
    /// Serializes read-modify-write sequences
    write_lock: Mutex<()>,
}

impl SledReservationStore {
    /// Open the store in the configured data directory
    pub fn new(config: &StorageConfig) -> StoreResult<Self> {
        if config.is_memory() {
            return Err(StoreError::Backend(
                "Sled store requires a data directory".to_string(),
            ));
        }
        Self::open(&config.data_dir)
    }

    /// Open or create a sled database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)
            .map_err(|e| StoreError::Backend(format!("Failed to open sled db: {}", e)))?;
        let reservations = db
            .open_tree(RESERVATIONS_TREE)
            .map_err(|e| StoreError::Backend(format!("Failed to open reservations tree: {}", e)))?;

        Ok(Self {
            db,
            reservations,
            write_lock: Mutex::new(()),
        })
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> StoreResult<()> {
        self.db.flush_async().await?;
        Ok(())
    }

    fn serialize<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn read(&self, id: ReservationId) -> StoreResult<Option<Reservation>> {
        match self.reservations.get(id.to_key())? {
            Some(bytes) => Ok(Some(Self::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, reservation: &Reservation) -> StoreResult<()> {
        self.reservations
            .insert(reservation.id.to_key(), Self::serialize(reservation)?)?;
        Ok(())
    }

    fn scan<F>(&self, mut keep: F, limit: usize) -> StoreResult<Vec<Reservation>>
    where
        F: FnMut(&Reservation) -> bool,
    {
        let mut found = Vec::new();
        for item in self.reservations.iter() {
            if found.len() >= limit {
                break;
            }
            let (key, value) = item?;
            let reservation: Reservation = match Self::deserialize(&value) {
                Ok(reservation) => reservation,
                Err(e) => {
                    error!(key = ?&key[..], error = %e, "Skipping undecodable reservation record");
                    continue;
                }
            };
            if keep(&reservation) {
                found.push(reservation);
            }
        }
        Ok(found)
    }
}

#[async_trait]
impl ReservationStore for SledReservationStore {
    async fn create(&self, request: NewReservation) -> StoreResult<Reservation> {
        let request = request.validate()?;

        let _guard = self.write_lock.lock().await;
        let id = ReservationId(self.db.generate_id()? + 1);
        let reservation = request.into_reservation(id, Utc::now());
        self.write(&reservation)?;

        debug!(reservation_id = %id, "Reservation stored");
        Ok(reservation)
    }

    async fn get(&self, id: ReservationId) -> StoreResult<Option<Reservation>> {
        self.read(id)
    }

    async fn list_by_idempotency_key(&self, idempotency_key: &str) -> StoreResult<Vec<Reservation>> {
        self.scan(|r| r.idempotency_key == idempotency_key, usize::MAX)
    }

    async fn list_by_status(&self, status: ReservationStatus, limit: usize) -> StoreResult<Vec<Reservation>> {
        self.scan(|r| r.status == status, limit)
    }

    async fn update(&self, reservation: &Reservation) -> StoreResult<Reservation> {
        let _guard = self.write_lock.lock().await;
        let stored = self
            .read(reservation.id)?
            .ok_or(StoreError::NotFound(reservation.id))?;

        let updated = apply_update(&stored, reservation)?;
        self.write(&updated)?;
        Ok(updated)
    }

    async fn delete(&self, id: ReservationId, idempotency_key: &str) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        match self.read(id)? {
            Some(r) if r.idempotency_key == idempotency_key => {
                self.reservations.remove(id.to_key())?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
