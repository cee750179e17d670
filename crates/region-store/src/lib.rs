//! Persisted state for the vigilance bot.
//!
//! The state is one small document: the last issued API token and the
//! watched regions with their last observed alert level. It is always
//! rewritten as a whole.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use region_store::{parse_region_list, JsonFileStore, SharedState};
//!
//! # async fn example() -> region_store::Result<()> {
//! let state = SharedState::new(Arc::new(JsonFileStore::new("data/vigilance.json")));
//!
//! let regions = parse_region_list("75 13").expect("numeric ids");
//! state.modify(move |s| s.watch(&regions)).await?;
//!
//! println!("Watching: {:?}", state.load().await?.watched());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod shared;
pub mod state;
pub mod store;
pub mod validation;

pub use error::{Result, StoreError};
pub use shared::SharedState;
pub use state::BotState;
pub use store::{JsonFileStore, MemoryStore, StateStore};
pub use validation::{parse_region_list, ValidationError};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
