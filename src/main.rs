mod bot;

use std::{path::PathBuf, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::bot::{
    audio::player::TracingPlayer,
    commands::{commands::BotResult, CommandRegistry},
    config::loader::DEFAULT_CONFIG_PATH,
    platforms::discord::event_loop::run_discord_gateway,
    ratelimit::clock::SystemClock,
    state::def::{AppState, BotError},
};

#[tokio::main]
async fn main() -> BotResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    dotenvy::dotenv().ok();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SOUNDBOT_CONFIG").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let token = dotenvy::var("DISCORD_TOKEN").map_err(|_| BotError::Custom("DISCORD_TOKEN is not set".into()))?;

    let state = Arc::new(
        AppState::load(config_path, Arc::new(CommandRegistry::new()), Arc::new(TracingPlayer::new()), Arc::new(SystemClock)).await?,
    );

    loop {
        match run_discord_gateway(&token, state.clone()).await {
            Ok(()) => info!("Restarting Discord session"),
            Err(e) => {
                error!("Discord session ended: {e}");
                sleep(Duration::from_secs(5)).await;
            }
        }
    }
}
