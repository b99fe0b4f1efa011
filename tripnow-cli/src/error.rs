//! CLI Error Types

use thiserror::Error;

use tripnow_store::StoreError;
use tripnow_worker::WorkerError;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Store could not be opened or flushed
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    /// Poll cycle failed
    #[error("Worker error: {0}")]
    WorkerError(#[from] WorkerError),

    /// Server error
    #[error("Server error: {message}")]
    ServerError { message: String },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        CliError::ConfigError {
            message: message.into(),
        }
    }

    /// Create a server error
    pub fn server(message: impl Into<String>) -> Self {
        CliError::ServerError {
            message: message.into(),
        }
    }

    /// Get exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::ConfigError { .. } => 1,
            CliError::StoreError(_) => 2,
            CliError::WorkerError(_) => 3,
            CliError::ServerError { .. } => 4,
            CliError::JsonError(_) => 5,
        }
    }
}
