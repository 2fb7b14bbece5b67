use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::bot::{chat_event::chat_event::ChatEvent, handler::handler::{handle_event, ChatClient}, state::def::AppState};

pub mod audio;
pub mod chat_event;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod handler;
pub mod permissions;
pub mod ratelimit;
pub mod replies;
pub mod runtime;
pub mod platforms;
pub mod state;

#[cfg(test)]
pub mod testing;

/// Drains gateway events until every sender is gone. Each event gets its own
/// task so one slow handler does not hold up other users.
pub async fn run_event_loop<C>(state: Arc<AppState>, client: Arc<C>, mut rx: UnboundedReceiver<ChatEvent>)
where
    C: ChatClient + 'static,
{
    while let Some(event) = rx.recv().await {
        let state = state.clone();
        let client = client.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_event(event, state, client.as_ref()).await {
                tracing::error!("Event error: {e:?}");
            }
        });
    }

    tracing::info!("Event loop finished");
}
