//! Serialized read-modify-write access to a state store.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::Result;
use crate::state::BotState;
use crate::store::StateStore;

/// A state store shared by every component of the bot.
///
/// All mutations go through [`SharedState::modify`], which holds a write lock
/// across load, change and save. A reconciliation and a watch-list edit
/// therefore never overwrite each other.
#[derive(Clone)]
pub struct SharedState {
    store: Arc<dyn StateStore>,
    write_lock: Arc<Mutex<()>>,
}

impl SharedState {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Read the current state.
    pub async fn load(&self) -> Result<BotState> {
        self.store.load().await
    }

    /// Apply `change` to the current state and save the result as one write.
    ///
    /// Nothing is saved if loading fails.
    pub async fn modify<F, R>(&self, change: F) -> Result<R>
    where
        F: FnOnce(&mut BotState) -> R + Send,
        R: Send,
    {
        let _guard = self.write_lock.lock().await;

        let mut state = self.store.load().await?;
        let result = change(&mut state);
        self.store.save(&state).await?;

        Ok(result)
    }
}

impl std::fmt::Debug for SharedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedState").finish_non_exhaustive()
    }
}
