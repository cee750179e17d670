//! One poll cycle: fetch, reconcile, notify.

use std::collections::BTreeSet;
use std::sync::Arc;

use broadcaster::RelayError;
use meteo_client::{
    extract_bulletin_texts, extract_levels, ApiError, BulletinText, Credential, RegionId, VigilanceApi,
};
use region_store::{SharedState, StoreError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::credentials::CredentialProvider;
use crate::notifier::{compose, compose_downgrades, Notifier};
use crate::reconcile::{reconcile, Reconciliation};

/// Errors that abort a poll cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("state error: {0}")]
    Store(#[from] StoreError),

    #[error("notification error: {0}")]
    Relay(#[from] RelayError),
}

/// What a cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub watched: usize,
    pub escalations: usize,
    pub downgrades: usize,
    pub segments_sent: usize,
}

/// Everything one poll cycle needs.
#[derive(Debug, Clone)]
pub struct PollCycle {
    credentials: Arc<CredentialProvider>,
    api: VigilanceApi,
    state: SharedState,
    notifier: Notifier,
}

impl PollCycle {
    pub fn new(
        credentials: Arc<CredentialProvider>,
        api: VigilanceApi,
        state: SharedState,
        notifier: Notifier,
    ) -> Self {
        Self {
            credentials,
            api,
            state,
            notifier,
        }
    }

    /// Run one cycle.
    ///
    /// No current map is not an error: the cycle ends without touching the
    /// state. Levels are persisted before the notification is sent, so a
    /// failed send is not repeated on the next cycle.
    pub async fn run(&self) -> Result<CycleReport, CycleError> {
        let credential = self.credentials.acquire().await?;

        let watched = self.state.load().await?.watched();
        let mut report = CycleReport {
            watched: watched.len(),
            ..Default::default()
        };
        if watched.is_empty() {
            info!("No region watched, skipping cycle");
            return Ok(report);
        }

        let carte = match self.api.fetch_carte(&credential).await {
            Ok(carte) => carte,
            Err(e) if e.is_not_found() => {
                info!("No current vigilance map");
                return Ok(report);
            }
            Err(e) => return Err(e.into()),
        };

        let levels = extract_levels(&carte, &watched);
        debug!(regions = levels.len(), "Extracted alert levels");

        let outcome = self
            .state
            .modify(move |state| reconcile(&levels, &mut state.regions))
            .await?;

        report.escalations = outcome.escalations.len();
        report.downgrades = outcome.downgrades.len();
        if outcome.is_quiet() {
            info!("RAS, no vigilance change");
            return Ok(report);
        }

        let bulletins = self.escalation_bulletins(&credential, &outcome).await?;

        let mut message = compose_downgrades(&outcome.downgrades);
        message.push_str(&compose(&outcome.escalations, &bulletins));

        report.segments_sent = self.notifier.dispatch(&message).await?;
        info!(
            escalations = report.escalations,
            downgrades = report.downgrades,
            segments = report.segments_sent,
            "Poll cycle complete"
        );
        Ok(report)
    }

    /// Bulletins for the escalated regions only.
    async fn escalation_bulletins(
        &self,
        credential: &Credential,
        outcome: &Reconciliation,
    ) -> Result<Vec<BulletinText>, ApiError> {
        if outcome.escalations.is_empty() {
            return Ok(Vec::new());
        }

        let texts = match self.api.fetch_texts(credential).await {
            Ok(texts) => texts,
            Err(e) if e.is_not_found() => {
                warn!("No current bulletin text, notifying without it");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let targets: BTreeSet<RegionId> = outcome.escalations.keys().cloned().collect();
        extract_bulletin_texts(&texts, &targets)
    }
}
