//! Process configuration, read once at startup.

use std::env;
use std::path::PathBuf;

use broadcaster::{BroadcasterConfig, Destination};
use meteo_client::{ApiConfig, ApiError};
use thiserror::Error;

/// Default location of the persisted state document.
pub const DEFAULT_STATE_PATH: &str = "./data/vigilance.json";

/// Default signal-cli daemon address.
pub const DEFAULT_DAEMON_URL: &str = "http://127.0.0.1:8080";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{0} environment variable is required")]
    Missing(&'static str),
}

/// Everything the bot needs to run.
#[derive(Debug)]
pub struct BotConfig {
    pub api: ApiConfig,
    pub state_path: PathBuf,
    pub relay: BroadcasterConfig,
    /// Group that receives scheduled notifications.
    pub channel: Destination,
}

impl BotConfig {
    /// Create from environment variables.
    ///
    /// Required: `METEO_APP_ID`, `VIGILANCE_GROUP_ID`.
    /// Optional: `METEO_TOKEN_URL`, `METEO_API_BASE`, `VIGILANCE_WORK_DIR`,
    /// `VIGILANCE_STATE_PATH`, `SIGNAL_DAEMON_URL`, `SIGNAL_DAEMON_ACCOUNT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api = ApiConfig::from_env()?;

        let state_path: PathBuf = env::var("VIGILANCE_STATE_PATH")
            .unwrap_or_else(|_| DEFAULT_STATE_PATH.to_string())
            .into();

        let group_id = env::var("VIGILANCE_GROUP_ID")
            .ok()
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigError::Missing("VIGILANCE_GROUP_ID"))?;

        let daemon_url = env::var("SIGNAL_DAEMON_URL").unwrap_or_else(|_| DEFAULT_DAEMON_URL.to_string());
        let relay = match env::var("SIGNAL_DAEMON_ACCOUNT") {
            Ok(account) if !account.is_empty() => BroadcasterConfig::with_account(daemon_url, account),
            _ => BroadcasterConfig::new(daemon_url),
        };

        Ok(Self {
            api,
            state_path,
            relay,
            channel: Destination::Group(group_id.trim().to_string()),
        })
    }
}
