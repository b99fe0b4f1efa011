//! Worker error types

use thiserror::Error;

use tripnow_core::CoreError;
use tripnow_store::StoreError;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("State transition error: {0}")]
    Transition(#[from] CoreError),
}

pub type WorkerResult<T> = Result<T, WorkerError>;
