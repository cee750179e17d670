//! Relay error types.

use thiserror::Error;

/// Errors that can occur while talking to the signal-cli daemon.
#[derive(Debug, Error)]
pub enum RelayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON-RPC error response from the daemon.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i32, message: String },

    /// The daemon answered with a non-success status.
    #[error("daemon returned {0}")]
    Status(String),

    /// Daemon health check failed.
    #[error("health check failed")]
    HealthCheckFailed,

    /// Event stream error.
    #[error("SSE error: {0}")]
    Sse(String),
}
