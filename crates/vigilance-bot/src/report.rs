//! On-demand vigilance report.

use std::path::Path;
use std::sync::Arc;

use broadcaster::{ChatSender, Destination, OutgoingMessage, RelayError};
use meteo_client::{
    extract_bulletin_texts, extract_period_summaries, ApiError, BulletinText, Credential, VigilanceApi,
};
use region_store::{SharedState, StoreError};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::credentials::CredentialProvider;
use crate::notifier::{format_bulletins, split, MAX_SEGMENT_CHARS};

/// First line of every report.
pub const REPORT_HEADER: &str = "**Vigilance en cours:**\n\n";

/// Why a report could not be delivered.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("credential failure: {0}")]
    Credential(#[source] ApiError),

    #[error("national image unavailable: {0}")]
    Image(#[source] ApiError),

    #[error("no vigilance currently published")]
    NoCurrentAlert,

    #[error("bulletin text unavailable: {0}")]
    Text(#[source] ApiError),

    #[error("state error: {0}")]
    Store(#[from] StoreError),

    #[error("could not send the image: {0}")]
    Attachment(#[source] RelayError),

    #[error("could not send the report: {0}")]
    Delivery(#[source] RelayError),
}

impl ReportError {
    /// Short French message sent back to the requester.
    pub fn user_message(&self) -> &'static str {
        match self {
            ReportError::Credential(_) => "Erreur pendant la génération de token.",
            ReportError::Image(_) => "Erreur pendant le chargement de l'image.",
            ReportError::NoCurrentAlert => "Pas de vigilance en cours.",
            ReportError::Text(_) => "Erreur pendant le chargement du texte.",
            ReportError::Attachment(_) => "Erreur lors de l'envoi du fichier.",
            ReportError::Store(_) | ReportError::Delivery(_) => {
                "Erreur lors du téléchargement des données. Réessayez. Si le problème persiste, contactez l'administrateur."
            }
        }
    }
}

/// Header, departmental bulletins, then national period summaries.
pub fn build_report(bulletins: &[BulletinText], summaries: &[String]) -> String {
    let mut report = String::from(REPORT_HEADER);
    report.push_str(&format_bulletins(bulletins));
    for summary in summaries {
        report.push_str(summary);
        report.push_str("\n\n");
    }
    report
}

/// Answers a report request with the national image and the current texts.
#[derive(Clone)]
pub struct ReportHandler {
    credentials: Arc<CredentialProvider>,
    api: VigilanceApi,
    state: SharedState,
    sender: Arc<dyn ChatSender>,
}

impl ReportHandler {
    pub fn new(
        credentials: Arc<CredentialProvider>,
        api: VigilanceApi,
        state: SharedState,
        sender: Arc<dyn ChatSender>,
    ) -> Self {
        Self {
            credentials,
            api,
            state,
            sender,
        }
    }

    /// Deliver a report to `destination`.
    ///
    /// On failure the requester gets a short explanation instead; the
    /// error is still returned for logging.
    pub async fn handle(&self, destination: &Destination) -> Result<usize, ReportError> {
        match self.deliver(destination).await {
            Ok(segments) => {
                info!(segments, "Vigilance report delivered");
                Ok(segments)
            }
            Err(e) => {
                error!("Vigilance report failed: {}", e);
                let reply = OutgoingMessage::text(e.user_message());
                if let Err(send_err) = self.sender.send(destination, &reply).await {
                    warn!("Could not send the failure notice: {}", send_err);
                }
                Err(e)
            }
        }
    }

    async fn deliver(&self, destination: &Destination) -> Result<usize, ReportError> {
        let credential = self.credentials.acquire().await.map_err(ReportError::Credential)?;

        let image = self.api.fetch_image(&credential).await.map_err(ReportError::Image)?;
        let outcome = self.send_with_image(destination, &credential, &image).await;
        remove_image(&image).await;

        outcome
    }

    /// Everything after the image fetch. The caller removes the image
    /// whatever the outcome.
    async fn send_with_image(
        &self,
        destination: &Destination,
        credential: &Credential,
        image: &Path,
    ) -> Result<usize, ReportError> {
        let texts = self.api.fetch_texts(credential).await.map_err(text_error)?;
        let carte = self.api.fetch_carte(credential).await.map_err(text_error)?;

        let watched = self.state.load().await?.watched();
        let bulletins = extract_bulletin_texts(&texts, &watched).map_err(ReportError::Text)?;
        let summaries = extract_period_summaries(&carte);

        let mut segments = split(&build_report(&bulletins, &summaries), MAX_SEGMENT_CHARS).into_iter();
        let first = segments.next().unwrap_or_default();

        self.sender
            .send(destination, &OutgoingMessage::text(first).with_attachment(image))
            .await
            .map_err(ReportError::Attachment)?;

        let mut sent = 1;
        for segment in segments {
            self.sender
                .send(destination, &OutgoingMessage::text(segment))
                .await
                .map_err(ReportError::Delivery)?;
            sent += 1;
        }

        Ok(sent)
    }
}

impl std::fmt::Debug for ReportHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportHandler")
            .field("api", &self.api)
            .finish_non_exhaustive()
    }
}

fn text_error(e: ApiError) -> ReportError {
    if e.is_not_found() {
        ReportError::NoCurrentAlert
    } else {
        ReportError::Text(e)
    }
}

async fn remove_image(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), "Could not remove report image: {}", e);
    }
}
