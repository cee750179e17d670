//! Outbound messages through the signal-cli JSON-RPC endpoint.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::BroadcasterConfig;
use crate::error::RelayError;

/// Where a message goes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    /// A single user, by phone number.
    Direct(String),
    /// A Signal group, by group id.
    Group(String),
}

/// A text message with an optional file attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    /// Local path read by the daemon.
    pub attachment: Option<PathBuf>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachment = Some(path.into());
        self
    }
}

/// Sends one message to one destination.
///
/// There is no batching: multi-part messages are sent one call at a time
/// and a failure leaves the earlier parts delivered.
#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send(&self, destination: &Destination, message: &OutgoingMessage) -> Result<(), RelayError>;
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a, T: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    params: T,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i32,
    message: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendParams {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    recipient: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    group_id: Vec<String>,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    account: Option<String>,
}

impl SendParams {
    fn build(destination: &Destination, message: &OutgoingMessage, account: Option<String>) -> Self {
        let mut params = Self {
            message: message.text.clone(),
            account,
            ..Default::default()
        };
        match destination {
            Destination::Direct(number) => params.recipient.push(number.clone()),
            Destination::Group(group_id) => params.group_id.push(group_id.clone()),
        }
        if let Some(path) = &message.attachment {
            params.attachments.push(path.to_string_lossy().into_owned());
        }
        params
    }
}

/// [`ChatSender`] backed by a signal-cli daemon.
#[derive(Clone)]
pub struct Broadcaster {
    http: Client,
    config: BroadcasterConfig,
    request_id: Arc<AtomicU64>,
}

impl Broadcaster {
    /// Connect to the daemon, failing if its health check does not pass.
    pub async fn connect(config: BroadcasterConfig) -> Result<Self, RelayError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let broadcaster = Self {
            http,
            config,
            request_id: Arc::new(AtomicU64::new(1)),
        };

        if !broadcaster.health_check().await? {
            return Err(RelayError::HealthCheckFailed);
        }
        info!("Broadcaster connected to daemon at {}", broadcaster.config.base_url);

        Ok(broadcaster)
    }

    /// Check that the daemon answers.
    pub async fn health_check(&self) -> Result<bool, RelayError> {
        let response = self.http.get(self.config.check_url()).send().await?;
        Ok(response.status().is_success())
    }

    pub fn config(&self) -> &BroadcasterConfig {
        &self.config
    }

    async fn rpc_call<P: Serialize>(&self, method: &str, params: P) -> Result<serde_json::Value, RelayError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        debug!("RPC call: {} (id={})", method, id);

        let request = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        let response = self
            .http
            .post(self.config.rpc_url())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Status(format!("HTTP {}: {}", status, body)));
        }

        let rpc: RpcResponse = response.json().await?;
        if let Some(error) = rpc.error {
            return Err(RelayError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(rpc.result.unwrap_or(serde_json::Value::Null))
    }
}

#[async_trait]
impl ChatSender for Broadcaster {
    async fn send(&self, destination: &Destination, message: &OutgoingMessage) -> Result<(), RelayError> {
        info!(
            destination = ?destination,
            chars = message.text.chars().count(),
            attachment = message.attachment.is_some(),
            "Sending message"
        );
        let params = SendParams::build(destination, message, self.config.account.clone());
        self.rpc_call("send", params).await?;
        Ok(())
    }
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("config", &self.config)
            .finish()
    }
}
