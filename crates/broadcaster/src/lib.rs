//! Signal relay for the vigilance bot.
//!
//! This crate provides the chat side of the bot on top of the signal-cli
//! daemon's HTTP interface:
//!
//! - [`ChatSender`], the seam the core sends through
//! - [`Broadcaster`], its JSON-RPC implementation (text + file attachment)
//! - [`subscribe`], a stream of inbound text messages for command handling
//!
//! # Example
//!
//! ```no_run
//! use broadcaster::{Broadcaster, BroadcasterConfig, ChatSender, Destination, OutgoingMessage};
//!
//! # async fn example() -> Result<(), broadcaster::RelayError> {
//! let config = BroadcasterConfig::default();
//! let broadcaster = Broadcaster::connect(config).await?;
//!
//! let channel = Destination::Group("GROUP_ID".to_string());
//! broadcaster.send(&channel, &OutgoingMessage::text("Vigilance orange")).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod listener;
pub mod sender;

pub use config::BroadcasterConfig;
pub use error::RelayError;
pub use listener::{subscribe, InboundText};
pub use sender::{Broadcaster, ChatSender, Destination, OutgoingMessage};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
