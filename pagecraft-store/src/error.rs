//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors a gateway can report.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("gateway unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with an error.
    #[error("gateway error: {0}")]
    Gateway(String),

    /// The operation did not finish within the configured timeout.
    #[error("operation timed out")]
    Timeout,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored content could not be decoded.
    #[error("content error: {0}")]
    Content(#[from] pagecraft_types::Error),
}
