//! OAuth2 client-credentials token issuance.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::types::Credential;

/// Issues a fresh upstream credential.
///
/// Issuance has no retry of its own; a failure aborts the surrounding cycle
/// or invocation. Every failure is reported as [`ApiError::Credential`].
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue(&self) -> Result<Credential, ApiError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Token issuer for the Météo-France API portal.
pub struct OAuthIssuer {
    http: Client,
    token_url: String,
    app_id: SecretString,
}

impl OAuthIssuer {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            token_url: config.token_url.clone(),
            app_id: SecretString::from(config.app_id().to_string()),
        })
    }
}

#[async_trait]
impl TokenIssuer for OAuthIssuer {
    async fn issue(&self) -> Result<Credential, ApiError> {
        debug!("Requesting token from {}", self.token_url);

        let response = self
            .http
            .post(&self.token_url)
            .header("Authorization", format!("Basic {}", self.app_id.expose_secret()))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await
            .map_err(|e| ApiError::Credential(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Credential(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Credential(e.to_string()))?;
        let token = parse_token_response(&body)?;

        info!("Issued new API token");
        Ok(token)
    }
}

fn parse_token_response(body: &str) -> Result<Credential, ApiError> {
    let parsed: TokenResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::Credential(format!("unexpected token response: {}", e)))?;
    Ok(Credential::new(parsed.access_token))
}
