//! Store error types.

use thiserror::Error;

/// Errors that can occur while loading or saving state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the state file failed.
    #[error("state I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The state document could not be encoded or decoded.
    #[error("state encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
