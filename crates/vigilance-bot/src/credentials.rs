//! Per-use credential acquisition.

use std::sync::Arc;

use meteo_client::{ApiError, Credential, TokenIssuer};
use region_store::SharedState;
use tracing::{debug, warn};

/// Issues a fresh credential for every poll cycle or report, and records
/// it in the persisted state.
///
/// Tokens are never reused: the stored copy is informational only.
#[derive(Clone)]
pub struct CredentialProvider {
    issuer: Arc<dyn TokenIssuer>,
    state: SharedState,
}

impl CredentialProvider {
    pub fn new(issuer: Arc<dyn TokenIssuer>, state: SharedState) -> Self {
        Self { issuer, state }
    }

    /// Issue a credential and persist it.
    ///
    /// Both issuance and persistence failures are credential failures.
    pub async fn acquire(&self) -> Result<Credential, ApiError> {
        let credential = self.issuer.issue().await?;

        let token = credential.bearer().to_string();
        self.state
            .modify(move |state| state.access_token = Some(token))
            .await
            .map_err(|e| {
                warn!("Could not persist access token: {}", e);
                ApiError::Credential(format!("could not persist token: {}", e))
            })?;

        debug!("Access token refreshed");
        Ok(credential)
    }
}

impl std::fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialProvider").finish_non_exhaustive()
    }
}
