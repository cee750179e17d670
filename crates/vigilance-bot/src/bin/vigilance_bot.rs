use std::sync::Arc;

use broadcaster::{Broadcaster, ChatSender};
use meteo_client::{OAuthIssuer, VigilanceApi};
use region_store::{JsonFileStore, SharedState};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vigilance_bot::{listen, BotConfig, CommandRouter, CredentialProvider, Notifier, PollCycle, ReportHandler, Scheduler};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = BotConfig::from_env()?;
    info!(
        version = vigilance_bot::version(),
        state = %config.state_path.display(),
        daemon = %config.relay.base_url,
        "Starting vigilance bot"
    );

    let state = SharedState::new(Arc::new(JsonFileStore::new(&config.state_path)));
    let issuer = OAuthIssuer::new(&config.api)?;
    let credentials = Arc::new(CredentialProvider::new(Arc::new(issuer), state.clone()));
    let api = VigilanceApi::new(config.api)?;

    let sender: Arc<dyn ChatSender> = Arc::new(Broadcaster::connect(config.relay.clone()).await?);
    let notifier = Notifier::new(sender.clone(), config.channel);

    let cycle = Arc::new(PollCycle::new(credentials.clone(), api.clone(), state.clone(), notifier));
    let reports = Arc::new(ReportHandler::new(credentials, api, state.clone(), sender.clone()));
    let router = Arc::new(CommandRouter::new(state, reports, sender));
    let scheduler = Scheduler::new(cycle);

    tokio::select! {
        _ = scheduler.run() => {}
        result = listen(router, &config.relay) => {
            if let Err(e) = result {
                error!("Command listener stopped: {}", e);
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
