//! Configuration for the vigilance API client.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ApiError;
use crate::retry::RetryPolicy;

/// Default OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://portail-api.meteofrance.fr/token";

/// Default DPVigilance API base URL.
pub const DEFAULT_API_BASE: &str = "https://public-api.meteofrance.fr/public/DPVigilance/v1";

/// Default directory for fetched files.
pub const DEFAULT_WORK_DIR: &str = "./data/tmp";

/// Per-request HTTP timeout. A timeout is the transient failure class.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for talking to the vigilance API.
#[derive(Debug)]
pub struct ApiConfig {
    /// Token endpoint for the client-credentials grant.
    pub token_url: String,
    /// Base URL the endpoint paths are appended to.
    pub base_url: String,
    /// Directory where fetched bodies are written.
    pub work_dir: PathBuf,
    /// Retry policy shared by every endpoint.
    pub retry: RetryPolicy,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Application identifier sent as the Basic credential.
    app_id: SecretString,
}

impl ApiConfig {
    /// Create a configuration with default endpoints.
    pub fn new(app_id: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            base_url: DEFAULT_API_BASE.to_string(),
            work_dir: work_dir.into(),
            retry: RetryPolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            app_id: SecretString::from(app_id.into()),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `METEO_APP_ID` - Basic credential of the registered application
    ///
    /// Optional (with defaults):
    /// - `METEO_TOKEN_URL` - Default: portail-api token endpoint
    /// - `METEO_API_BASE` - Default: DPVigilance v1
    /// - `VIGILANCE_WORK_DIR` - Default: ./data/tmp
    pub fn from_env() -> Result<Self, ApiError> {
        let app_id = env::var("METEO_APP_ID")
            .map_err(|_| ApiError::Config("METEO_APP_ID is required".to_string()))?;
        let work_dir = env::var("VIGILANCE_WORK_DIR").unwrap_or_else(|_| DEFAULT_WORK_DIR.to_string());

        let mut config = Self::new(app_id, work_dir);
        if let Ok(url) = env::var("METEO_TOKEN_URL") {
            config.token_url = url;
        }
        if let Ok(base) = env::var("METEO_API_BASE") {
            config = config.with_base_url(base);
        }
        Ok(config)
    }

    /// Builder method to set the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder method to set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Full URL of an endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub(crate) fn app_id(&self) -> &str {
        self.app_id.expose_secret()
    }
}
