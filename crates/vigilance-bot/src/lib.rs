//! Météo-France vigilance bot.
//!
//! Every half hour the bot fetches the current alert map, compares the level
//! of each watched département with the last one it saw, and posts what
//! changed to a Signal group. Users can also ask for the current national
//! picture with `/vigilance` and edit the watch list with `/config`.
//!
//! # Architecture
//!
//! ```text
//! Scheduler ──> PollCycle ──> CredentialProvider ──> meteo-client
//!                  │                                      │
//!                  ├──> reconcile (region-store) <────────┘
//!                  └──> Notifier ──> broadcaster ──> signal-cli
//!
//! listener ──> CommandRouter ──> ReportHandler / watch list
//! ```

pub mod commands;
pub mod config;
pub mod credentials;
pub mod notifier;
pub mod poll;
pub mod reconcile;
pub mod report;
pub mod scheduler;

pub use commands::{listen, Command, CommandRouter};
pub use config::{BotConfig, ConfigError};
pub use credentials::CredentialProvider;
pub use notifier::{compose, compose_downgrades, split, Notifier, MAX_SEGMENT_CHARS};
pub use poll::{CycleError, CycleReport, PollCycle};
pub use reconcile::{reconcile, Reconciliation};
pub use report::{build_report, ReportError, ReportHandler};
pub use scheduler::{Scheduler, SingleFlight, POLL_PERIOD};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
