use std::{future::Future, sync::Arc};

use tracing::{debug, error, info, warn};

use crate::bot::{
    chat_event::chat_event::ChatEvent,
    commands::commands::BotResult,
    dispatcher::dispatcher::{CommandInvocation, Rejection, Resolution},
    replies::Replies,
    state::def::AppState,
};

pub trait ChatClient: Send + Sync {
    fn send_message(&self, channel_id: u64, message: &str) -> impl Future<Output = BotResult<()>> + Send;
    fn send_direct(&self, user_id: u64, message: &str) -> impl Future<Output = BotResult<()>> + Send;
}

pub async fn handle_event<C: ChatClient>(event: ChatEvent, state: Arc<AppState>, client: &C) -> BotResult<()> {
    let snapshot = state.resolver.snapshot();

    if !event.message.starts_with(&snapshot.prefix) {
        return Ok(());
    }

    let log_content = event.message.lines().collect::<Vec<_>>().join("\\n");
    info!(user = %event.user.name, channel = %event.channel.name, "{log_content}");

    if event.is_direct() {
        client.send_direct(event.user.id, &Replies::not_a_text_channel(&event.user.mention())).await?;
        return Ok(());
    }

    if !event.channel.name.contains(&snapshot.channel_filter) {
        client
            .send_direct(event.user.id, &Replies::channel_not_authorized(&event.user.mention(), &event.channel.name))
            .await?;
        return Ok(());
    }

    match state.resolver.resolve_in(&snapshot, &event.user.name, &event.message, event.timestamp) {
        Resolution::NotACommand => Ok(()),
        Resolution::Rejected(reason) => {
            let Some(reply) = Replies::rejection(&event.user.mention(), &reason) else {
                return Ok(());
            };
            // Cooldown notices go to the user so the bot channel stays quiet.
            match reason {
                Rejection::RateLimited(_) => client.send_direct(event.user.id, &reply).await,
                _ => client.send_message(event.channel.id, &reply).await,
            }
        }
        Resolution::Authorized(invocation) => dispatch(invocation, event, state, client).await,
    }
}

async fn dispatch<C: ChatClient>(invocation: CommandInvocation, event: ChatEvent, state: Arc<AppState>, client: &C) -> BotResult<()> {
    let Some(command) = state.registry.get(&invocation.command) else {
        warn!(command = %invocation.command, "No handler registered for command");
        return Ok(());
    };

    debug!(command = %invocation.command, user = %invocation.user, issued_at = %invocation.timestamp, "Dispatching command");

    let channel_id = event.channel.id;
    let mention = event.user.mention();
    let name = invocation.command.clone();

    match command.execute(invocation, event, state.clone()).await {
        Ok(Some(reply)) => client.send_message(channel_id, &reply).await,
        Ok(None) => Ok(()),
        Err(e) => {
            error!(command = %name, error = %e, "Command failed");
            client.send_message(channel_id, &Replies::command_failed(&mention, &name)).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::{
        ratelimit::clock::at,
        testing::{event, test_state, RecordingClient, Sent},
    };

    #[tokio::test]
    async fn plain_chat_is_ignored() {
        let (state, _dir) = test_state().await;
        let client = RecordingClient::default();

        handle_event(event("bob", "hello everyone", at(0)), state.clone(), &client).await.unwrap();
        handle_event(event("bob", "!dance", at(0)), state, &client).await.unwrap();

        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn authorized_command_reply_goes_to_the_channel() {
        let (state, _dir) = test_state().await;
        let client = RecordingClient::default();

        handle_event(event("bob", "!roll", at(0)), state, &client).await.unwrap();

        let sent = client.sent();
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            Sent::Channel(channel, text) => {
                assert_eq!(*channel, 10);
                assert!(text.contains("rolled a d20 and got"), "{text}");
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limited_user_is_told_by_direct_message() {
        let (state, _dir) = test_state().await;
        let client = RecordingClient::default();

        handle_event(event("bob", "!roll", at(0)), state.clone(), &client).await.unwrap();
        handle_event(event("bob", "!roll", at(2)), state, &client).await.unwrap();

        let sent = client.sent();
        assert_eq!(sent.len(), 2);
        assert!(matches!(&sent[0], Sent::Channel(10, _)));
        assert!(matches!(&sent[1], Sent::Direct(1, text) if text.contains("approximately 3 seconds")), "{sent:?}");
    }

    #[tokio::test]
    async fn non_admin_is_told_about_privileged_commands() {
        let (state, _dir) = test_state().await;
        let client = RecordingClient::default();

        handle_event(event("bob", "!maintenance", at(0)), state.clone(), &client).await.unwrap();

        assert!(!state.resolver.maintenance().is_on());
        assert!(matches!(&client.sent()[0], Sent::Channel(10, text) if text.contains("need to be an admin")));
    }

    #[tokio::test]
    async fn maintenance_mode_reply_for_regular_users() {
        let (state, _dir) = test_state().await;
        let client = RecordingClient::default();

        handle_event(event("alice", "!maintenance on", at(0)), state.clone(), &client).await.unwrap();
        handle_event(event("bob", "!roll", at(0)), state.clone(), &client).await.unwrap();
        handle_event(event("alice", "!roll", at(0)), state, &client).await.unwrap();

        let sent = client.sent();
        assert!(matches!(&sent[0], Sent::Channel(_, text) if text == "Maintenance mode on"));
        assert!(matches!(&sent[1], Sent::Channel(_, text) if text.contains("maintenance mode")));
        assert!(matches!(&sent[2], Sent::Channel(_, text) if text.contains("rolled a d20")));
    }

    #[tokio::test]
    async fn commands_outside_bot_channels_get_a_direct_notice() {
        let (state, _dir) = test_state().await;
        let client = RecordingClient::default();

        let mut outside = event("bob", "!roll", at(0));
        outside.channel.name = "general".into();
        handle_event(outside, state.clone(), &client).await.unwrap();

        assert!(matches!(&client.sent()[0], Sent::Direct(1, text) if text.contains("channel general")));
        assert_eq!(state.resolver.limiter().tracked_users(), 0);
    }

    #[tokio::test]
    async fn direct_messages_are_refused() {
        let (state, _dir) = test_state().await;
        let client = RecordingClient::default();

        let mut direct = event("bob", "!roll", at(0));
        direct.guild_id = None;
        handle_event(direct, state, &client).await.unwrap();

        assert!(matches!(&client.sent()[0], Sent::Direct(1, text) if text.contains("not a server text channel")));
    }

    #[tokio::test]
    async fn play_without_any_voice_channel_explains_why() {
        let (state, _dir) = test_state().await;
        let client = RecordingClient::default();

        // play with nobody in voice and no voice channel to join
        let mut no_voice = event("bob", "!p air", at(0));
        no_voice.voice_channel = None;
        handle_event(no_voice, state, &client).await.unwrap();

        assert!(matches!(&client.sent()[0], Sent::Channel(10, text) if text.contains("not in a voice channel")));
    }
}
