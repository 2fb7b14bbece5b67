use std::sync::Arc;

use serenity::Client;
use tokio::sync::mpsc;
use tracing::info;

use crate::bot::{
    commands::commands::BotResult,
    platforms::discord::discord::{intents, DiscordClient, Handler},
    run_event_loop,
    state::def::{AppState, BotError},
};

/// Runs one gateway session. Returns `Ok` when a restart was requested, so
/// the caller can open a fresh session.
pub async fn run_discord_gateway(token: &str, state: Arc<AppState>) -> BotResult<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    let handler = Handler { tx, clock: state.clock.clone() };

    let mut client = Client::builder(token, intents()).event_handler(handler).await?;
    let chat_client = Arc::new(DiscordClient::new(client.http.clone()));
    let shard_manager = client.shard_manager.clone();

    let events = tokio::spawn(run_event_loop(state.clone(), chat_client, rx));

    let result = tokio::select! {
        result = client.start() => result.map_err(BotError::from),
        _ = state.lifecycle.restart_requested() => {
            info!("Restart requested, closing gateway session");
            shard_manager.shutdown_all().await;
            Ok(())
        }
    };

    events.abort();
    result
}
