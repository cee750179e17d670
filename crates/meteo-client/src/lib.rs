//! Météo-France vigilance API client.
//!
//! This crate covers everything the bot needs from the upstream alert API:
//!
//! - Issuing OAuth2 client-credentials tokens
//! - Fetching the alert-level map, the text bulletins and the national image
//!   with a bounded fixed-delay retry on transient network failures
//! - Extracting per-region alert levels, departmental bulletins and
//!   national summaries from the typed documents
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeSet;
//!
//! use meteo_client::{extract_levels, ApiConfig, OAuthIssuer, RegionId, TokenIssuer, VigilanceApi};
//!
//! # async fn example() -> Result<(), meteo_client::ApiError> {
//! let config = ApiConfig::from_env()?;
//! let issuer = OAuthIssuer::new(&config)?;
//! let api = VigilanceApi::new(config)?;
//!
//! let credential = issuer.issue().await?;
//! let carte = api.fetch_carte(&credential).await?;
//!
//! let watched: BTreeSet<RegionId> = ["75", "13"].into_iter().map(RegionId::from).collect();
//! for (region, level) in extract_levels(&carte, &watched) {
//!     println!("{}: {}", region, level);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod retry;
pub mod token;
pub mod transport;
pub mod types;

pub use client::{Endpoint, VigilanceApi};
pub use config::ApiConfig;
pub use error::ApiError;
pub use extract::{extract_bulletin_texts, extract_levels, extract_period_summaries, BulletinText};
pub use retry::{with_retry, RetryPolicy};
pub use token::{OAuthIssuer, TokenIssuer};
pub use transport::{HttpTransport, Transport};
pub use types::*;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
