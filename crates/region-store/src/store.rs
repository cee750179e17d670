//! State store backends.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::Result;
use crate::state::BotState;

/// Loads and saves the whole bot state.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the current state. A store that was never saved yields the default.
    async fn load(&self) -> Result<BotState>;

    /// Replace the stored state.
    async fn save(&self, state: &BotState) -> Result<()>;
}

/// State kept in a pretty-printed JSON file.
///
/// Saves go through a sibling temporary file and a rename, so readers never
/// see a half-written document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self) -> Result<BotState> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No state file yet, starting empty");
                Ok(BotState::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, state: &BotState) -> Result<()> {
        let encoded = serde_json::to_vec_pretty(state)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, &encoded).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        debug!(path = %self.path.display(), regions = state.regions.len(), "State saved");
        Ok(())
    }
}

/// In-memory store, for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<BotState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: BotState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> BotState {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> Result<BotState> {
        Ok(self.snapshot().await)
    }

    async fn save(&self, state: &BotState) -> Result<()> {
        *self.state.lock().await = state.clone();
        Ok(())
    }
}
