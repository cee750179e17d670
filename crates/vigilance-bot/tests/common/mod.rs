//! Fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use broadcaster::{ChatSender, Destination, OutgoingMessage, RelayError};
use meteo_client::{ApiConfig, ApiError, Credential, RetryPolicy, TokenIssuer, Transport, VigilanceApi};
use region_store::{BotState, MemoryStore, SharedState};
use serde_json::json;
use tempfile::TempDir;
use vigilance_bot::{CommandRouter, CredentialProvider, Notifier, PollCycle, ReportHandler};

pub const GROUP_ID: &str = "dmlnaWxhbmNl";
pub const CARTE: &str = "cartevigilance/encours";
pub const TEXTS: &str = "textesvigilance/encours";
pub const IMAGE: &str = "vignettenationale-J/encours";

// ============================================================================
// Upstream API
// ============================================================================

#[derive(Debug, Clone)]
pub enum Reply {
    Body(Vec<u8>),
    NotFound,
    Transient,
    Fail,
}

impl Reply {
    pub fn json(value: serde_json::Value) -> Self {
        Reply::Body(value.to_string().into_bytes())
    }
}

/// Answers by endpoint path and records every requested URL.
#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<HashMap<&'static str, Reply>>,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn set(&self, path: &'static str, reply: Reply) {
        self.replies.lock().unwrap().insert(path, reply);
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|url| url.ends_with(path)).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &str, credential: &Credential) -> Result<Vec<u8>, ApiError> {
        assert!(credential.bearer().starts_with("token-"));
        self.calls.lock().unwrap().push(url.to_string());

        let reply = self
            .replies
            .lock()
            .unwrap()
            .iter()
            .find(|(path, _)| url.ends_with(*path))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::NotFound) | None => Err(ApiError::NotFound { url: url.to_string() }),
            Some(Reply::Transient) => Err(ApiError::Transient("operation timed out".to_string())),
            Some(Reply::Fail) => Err(ApiError::Fetch("HTTP 500 Internal Server Error".to_string())),
        }
    }
}

#[derive(Default)]
pub struct FakeIssuer {
    issued: AtomicU32,
    pub fail: AtomicBool,
}

#[async_trait]
impl TokenIssuer for FakeIssuer {
    async fn issue(&self) -> Result<Credential, ApiError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::Credential("HTTP 401 Unauthorized".to_string()));
        }
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Credential::new(format!("token-{}", n)))
    }
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Debug, Clone)]
pub struct Sent {
    pub destination: Destination,
    pub message: OutgoingMessage,
    /// Whether the attachment was on disk when the message was sent.
    pub attachment_present: bool,
}

#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<Sent>>,
    pub fail_all: AtomicBool,
    pub fail_attachments: AtomicBool,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|s| s.message.text).collect()
    }
}

#[async_trait]
impl ChatSender for RecordingSender {
    async fn send(&self, destination: &Destination, message: &OutgoingMessage) -> Result<(), RelayError> {
        if self.fail_all.load(Ordering::SeqCst)
            || (message.attachment.is_some() && self.fail_attachments.load(Ordering::SeqCst))
        {
            return Err(RelayError::Status("HTTP 500".to_string()));
        }
        let attachment_present = message.attachment.as_ref().is_some_and(|path| path.exists());
        self.sent.lock().unwrap().push(Sent {
            destination: destination.clone(),
            message: message.clone(),
            attachment_present,
        });
        Ok(())
    }
}

// ============================================================================
// Wiring
// ============================================================================

pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub issuer: Arc<FakeIssuer>,
    pub store: Arc<MemoryStore>,
    pub sender: Arc<RecordingSender>,
    pub state: SharedState,
    pub credentials: Arc<CredentialProvider>,
    pub api: VigilanceApi,
    pub work_dir: TempDir,
}

impl Harness {
    pub fn new(initial: BotState) -> Self {
        let work_dir = TempDir::new().unwrap();
        let transport = Arc::new(FakeTransport::default());
        let issuer = Arc::new(FakeIssuer::default());
        let store = Arc::new(MemoryStore::with_state(initial));
        let sender = Arc::new(RecordingSender::default());
        let state = SharedState::new(store.clone());

        let config = ApiConfig::new("app-id", work_dir.path())
            .with_base_url("http://meteo.test/DPVigilance/v1/")
            .with_retry(RetryPolicy {
                max_retries: 2,
                delay: Duration::from_millis(1),
            });
        let api = VigilanceApi::with_transport(config, transport.clone());
        let credentials = Arc::new(CredentialProvider::new(issuer.clone(), state.clone()));

        Self {
            transport,
            issuer,
            store,
            sender,
            state,
            credentials,
            api,
            work_dir,
        }
    }

    /// A state watching `levels`, each at its given last level.
    pub fn watching(levels: &[(&str, u8)]) -> Self {
        let mut state = BotState::default();
        for (id, level) in levels {
            state.regions.insert((*id).into(), meteo_client::AlertLevel(*level));
        }
        Self::new(state)
    }

    pub fn poll_cycle(&self) -> PollCycle {
        let notifier = Notifier::new(self.sender.clone(), Destination::Group(GROUP_ID.to_string()));
        PollCycle::new(self.credentials.clone(), self.api.clone(), self.state.clone(), notifier)
    }

    pub fn report_handler(&self) -> ReportHandler {
        ReportHandler::new(
            self.credentials.clone(),
            self.api.clone(),
            self.state.clone(),
            self.sender.clone(),
        )
    }

    pub fn router(&self) -> CommandRouter {
        CommandRouter::new(self.state.clone(), Arc::new(self.report_handler()), self.sender.clone())
    }

    /// Files left in the work directory.
    pub fn leftover_files(&self) -> usize {
        std::fs::read_dir(self.work_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

// ============================================================================
// Documents
// ============================================================================

/// Alert map with one "J" period.
pub fn carte(levels: &[(&str, u8)], summary: &str) -> Reply {
    let domains: Vec<_> = levels
        .iter()
        .map(|(id, level)| json!({ "domain_id": id, "max_color_id": level }))
        .collect();

    Reply::json(json!({
        "product": {
            "periods": [{
                "echeance": "J",
                "text_items": { "text": [summary] },
                "timelaps": { "domain_ids": domains }
            }]
        }
    }))
}

/// Text document with one departmental bulletin per `(id, full name, text)`.
pub fn texts(bulletins: &[(&str, &str, &str)]) -> Reply {
    let items: Vec<_> = bulletins
        .iter()
        .map(|(id, name, text)| {
            json!({
                "bloc_id": "BULLETIN_DEPARTEMENTAL",
                "domain_id": id,
                "domain_name": name,
                "bloc_items": [{
                    "text_items": [{
                        "term_items": [{ "subdivision_text": [{ "text": [text] }] }]
                    }]
                }]
            })
        })
        .collect();

    Reply::json(json!({ "product": { "text_bloc_items": items } }))
}

pub fn image() -> Reply {
    Reply::Body(b"\x89PNG\r\n\x1a\n".to_vec())
}
