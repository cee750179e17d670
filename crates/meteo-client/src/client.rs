//! Vigilance API client with resilient fetches.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::retry::with_retry;
use crate::transport::{HttpTransport, Transport};
use crate::types::{CarteDocument, Credential, TextDocument};

/// The read endpoints used by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Alert-level map, also carrying the national period summaries.
    Carte,
    /// Departmental text bulletins.
    Texts,
    /// National vigilance image for today.
    NationalImage,
}

impl Endpoint {
    /// Path relative to the API base.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Carte => "cartevigilance/encours",
            Endpoint::Texts => "textesvigilance/encours",
            Endpoint::NationalImage => "vignettenationale-J/encours",
        }
    }

    /// Short name used in logs and file names.
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Carte => "carte",
            Endpoint::Texts => "textes",
            Endpoint::NationalImage => "vignette",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Endpoint::NationalImage => "png",
            _ => "json",
        }
    }
}

/// Client for the DPVigilance read endpoints.
///
/// Every endpoint goes through the same retry loop; only the transport is
/// swappable.
#[derive(Clone)]
pub struct VigilanceApi {
    transport: Arc<dyn Transport>,
    config: Arc<ApiConfig>,
}

impl VigilanceApi {
    /// Create a client backed by reqwest.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(config.request_timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client with a custom transport.
    pub fn with_transport(config: ApiConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config: Arc::new(config),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Fetch an endpoint and write the body to `destination`.
    pub async fn fetch(
        &self,
        endpoint: Endpoint,
        credential: &Credential,
        destination: &Path,
    ) -> Result<(), ApiError> {
        let url = self.config.url(endpoint.path());
        let url = url.as_str();
        let transport = &self.transport;
        info!(endpoint = endpoint.name(), "Fetching {}", url);

        let body = with_retry(&self.config.retry, endpoint.name(), move || {
            transport.get(url, credential)
        })
        .await?;

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(destination, &body).await?;
        debug!(endpoint = endpoint.name(), bytes = body.len(), path = %destination.display(), "Fetched");
        Ok(())
    }

    /// Fetch a JSON endpoint through a scratch file and parse it.
    ///
    /// The scratch file is removed whether or not parsing succeeds.
    pub async fn fetch_document<D: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        credential: &Credential,
    ) -> Result<D, ApiError> {
        let path = self.scratch_path(endpoint);
        self.fetch(endpoint, credential, &path).await?;

        let raw = tokio::fs::read(&path).await;
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(path = %path.display(), "Could not remove scratch file: {}", e);
        }

        Ok(serde_json::from_slice(&raw?)?)
    }

    /// Fetch the alert-level map.
    pub async fn fetch_carte(&self, credential: &Credential) -> Result<CarteDocument, ApiError> {
        self.fetch_document(Endpoint::Carte, credential).await
    }

    /// Fetch the text bulletins.
    pub async fn fetch_texts(&self, credential: &Credential) -> Result<TextDocument, ApiError> {
        self.fetch_document(Endpoint::Texts, credential).await
    }

    /// Fetch the national image into the work directory.
    ///
    /// The caller owns the returned file and removes it once delivered.
    pub async fn fetch_image(&self, credential: &Credential) -> Result<PathBuf, ApiError> {
        let path = self.scratch_path(Endpoint::NationalImage);
        self.fetch(Endpoint::NationalImage, credential, &path).await?;
        Ok(path)
    }

    /// Unique file per fetch so concurrent invocations never collide.
    fn scratch_path(&self, endpoint: Endpoint) -> PathBuf {
        self.config.work_dir.join(format!(
            "vigilance-{}-{}.{}",
            endpoint.name(),
            Uuid::new_v4(),
            endpoint.extension()
        ))
    }
}

impl std::fmt::Debug for VigilanceApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VigilanceApi")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}
