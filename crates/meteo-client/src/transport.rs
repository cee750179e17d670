//! Single-attempt HTTP transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::ApiError;
use crate::types::Credential;

/// One authenticated GET, no retries.
///
/// Implementations classify failures: [`ApiError::Transient`] for failures
/// worth retrying, [`ApiError::NotFound`] when the resource has no current
/// data, [`ApiError::Fetch`] for everything else.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, credential: &Credential) -> Result<Vec<u8>, ApiError>;
}

/// reqwest-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, credential: &Credential) -> Result<Vec<u8>, ApiError> {
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .header("accept", "*/*")
            .bearer_auth(credential.bearer())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound { url: url.to_string() });
        }
        if !status.is_success() {
            return Err(ApiError::Fetch(format!("HTTP {} from {}", status, url)));
        }

        let body = response.bytes().await.map_err(classify)?;
        Ok(body.to_vec())
    }
}

/// Timeouts and dropped connections are transient, the rest is not.
fn classify(err: reqwest::Error) -> ApiError {
    if err.is_timeout() || err.is_connect() {
        ApiError::Transient(err.to_string())
    } else {
        ApiError::Fetch(err.to_string())
    }
}
