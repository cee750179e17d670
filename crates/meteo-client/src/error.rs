//! Error types for meteo-client.

use thiserror::Error;

/// Errors that can occur when talking to the vigilance API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credential issuance failed (network, status, or body).
    #[error("token generation failed: {0}")]
    Credential(String),

    /// Network failure worth retrying (timeout, connection drop).
    #[error("transient fetch error: {0}")]
    Transient(String),

    /// Transient failures persisted past the retry budget.
    #[error("fetch failed after {attempts} attempts: {reason}")]
    RetriesExhausted { attempts: u32, reason: String },

    /// The endpoint has no current data.
    #[error("no current data at {url}")]
    NotFound { url: String },

    /// Any other fetch failure. Never retried.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The upstream document did not have the expected shape.
    #[error("malformed document: {0}")]
    Malformed(String),

    /// Reading or writing a fetched file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Whether this error means "nothing published right now".
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Malformed(err.to_string())
    }
}
