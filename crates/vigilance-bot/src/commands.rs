//! Chat commands: on-demand report and watch-list edits.

use std::sync::Arc;
use std::time::Duration;

use broadcaster::{subscribe, BroadcasterConfig, ChatSender, Destination, InboundText, OutgoingMessage, RelayError};
use futures::StreamExt;
use region_store::{parse_region_list, SharedState, StoreError};
use tracing::{debug, error, info, warn};

use crate::report::ReportHandler;

/// Reply when a region list does not validate.
pub const INVALID_REGIONS: &str = "Erreur: Les départements doivent être des chiffres séparés par des espaces.";

/// Reply when the watch list is empty.
pub const NO_REGIONS: &str = "Aucun département disponible.";

/// Reply when a command fails for an internal reason.
pub const COMMAND_FAILED: &str =
    "Quelque chose ne va pas avec cette commande, rapprochez-vous de mon administrateur.";

/// Reply to `/config` without a known subcommand.
pub const CONFIG_USAGE: &str = "Usage: /config add <départements> | /config remove <départements> | /config list";

/// Pause before resubscribing after the event stream ends.
const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(5);

/// A recognised chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/vigilance`
    Report,
    /// `/config add <ids>`
    Add(String),
    /// `/config remove <ids>`
    Remove(String),
    /// `/config list`
    List,
    /// `/config` with a missing or unknown subcommand.
    ConfigUsage,
}

impl Command {
    /// Parse a message body. Anything that is not a command yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (name, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));

        match name {
            "/vigilance" => Some(Command::Report),
            "/config" => {
                let rest = rest.trim();
                let (sub, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let args = args.trim().to_string();
                Some(match sub {
                    "add" => Command::Add(args),
                    "remove" => Command::Remove(args),
                    "list" => Command::List,
                    _ => Command::ConfigUsage,
                })
            }
            _ => None,
        }
    }
}

/// Dispatches inbound messages to the matching command.
#[derive(Clone)]
pub struct CommandRouter {
    state: SharedState,
    reports: Arc<ReportHandler>,
    sender: Arc<dyn ChatSender>,
}

impl CommandRouter {
    pub fn new(state: SharedState, reports: Arc<ReportHandler>, sender: Arc<dyn ChatSender>) -> Self {
        Self { state, reports, sender }
    }

    /// Handle one inbound message. Returns whether it was a command.
    pub async fn handle(&self, inbound: &InboundText) -> bool {
        let Some(command) = Command::parse(&inbound.text) else {
            return false;
        };
        info!(sender = %inbound.sender, command = ?command, "Received command");

        let destination = inbound.reply_to();
        if command == Command::Report {
            // The handler answers on its own, failures included.
            let _ = self.reports.handle(&destination).await;
            return true;
        }

        let reply = match self.watch_list_reply(command).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Watch-list command failed: {}", e);
                COMMAND_FAILED.to_string()
            }
        };
        self.reply(&destination, reply).await;
        true
    }

    /// Apply a watch-list command and build its reply.
    pub async fn watch_list_reply(&self, command: Command) -> Result<String, StoreError> {
        match command {
            Command::Add(args) => {
                let Ok(regions) = parse_region_list(&args) else {
                    return Ok(INVALID_REGIONS.to_string());
                };
                let listed = self
                    .state
                    .modify(move |state| {
                        state.watch(&regions);
                        state.watched_display()
                    })
                    .await?;
                Ok(format!("Configuration mise à jour: Départements: {}", listed))
            }
            Command::Remove(args) => {
                let Ok(regions) = parse_region_list(&args) else {
                    return Ok(INVALID_REGIONS.to_string());
                };
                let listed = self
                    .state
                    .modify(move |state| {
                        state.unwatch(&regions);
                        state.watched_display()
                    })
                    .await?;
                Ok(format!("Configuration mise à jour: Départements: {}", listed))
            }
            Command::List => {
                let state = self.state.load().await?;
                if state.regions.is_empty() {
                    Ok(NO_REGIONS.to_string())
                } else {
                    Ok(format!("Départements configurés: {}", state.watched_display()))
                }
            }
            Command::ConfigUsage | Command::Report => Ok(CONFIG_USAGE.to_string()),
        }
    }

    async fn reply(&self, destination: &Destination, text: String) {
        if let Err(e) = self.sender.send(destination, &OutgoingMessage::text(text)).await {
            warn!("Could not send command reply: {}", e);
        }
    }
}

impl std::fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRouter").finish_non_exhaustive()
    }
}

/// Listen for commands until the process stops.
///
/// Each command runs in its own task so a slow report does not hold up
/// the next message.
pub async fn listen(router: Arc<CommandRouter>, config: &BroadcasterConfig) -> Result<(), RelayError> {
    loop {
        let stream = subscribe(config)?;
        tokio::pin!(stream);

        while let Some(item) = stream.next().await {
            match item {
                Ok(inbound) => {
                    let router = router.clone();
                    tokio::spawn(async move {
                        if !router.handle(&inbound).await {
                            debug!(sender = %inbound.sender, "Ignoring non-command message");
                        }
                    });
                }
                Err(e) => warn!("Event stream error: {}", e),
            }
        }

        warn!("Event stream ended, resubscribing");
        tokio::time::sleep(RESUBSCRIBE_DELAY).await;
    }
}
