//! Connection settings for the signal-cli daemon.

/// Where the signal-cli daemon listens and which account it sends from.
#[derive(Debug, Clone)]
pub struct BroadcasterConfig {
    /// Base URL of the daemon HTTP server (e.g., "http://127.0.0.1:8080").
    pub base_url: String,
    /// Account phone number for multi-account daemons.
    pub account: Option<String>,
}

impl BroadcasterConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            account: None,
        }
    }

    pub fn with_account(base_url: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            account: Some(account.into()),
            ..Self::new(base_url)
        }
    }

    pub fn rpc_url(&self) -> String {
        format!("{}/api/v1/rpc", self.base_url)
    }

    pub fn events_url(&self) -> String {
        match &self.account {
            Some(account) => format!(
                "{}/api/v1/events?account={}",
                self.base_url,
                urlencoding::encode(account)
            ),
            None => format!("{}/api/v1/events", self.base_url),
        }
    }

    pub fn check_url(&self) -> String {
        format!("{}/api/v1/check", self.base_url)
    }
}

impl Default for BroadcasterConfig {
    fn default() -> Self {
        Self::new("http://127.0.0.1:8080")
    }
}
