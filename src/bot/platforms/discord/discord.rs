use std::sync::Arc;

use serenity::{
    all::{ChannelId, Context, CreateMessage, EventHandler, GatewayIntents, Http, Message, Ready, UserId},
    async_trait,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::bot::{
    chat_event::chat_event::{ChatChannel, ChatEvent, ChatUser},
    commands::commands::BotResult,
    handler::handler::ChatClient,
    ratelimit::clock::Clock,
    replies::{split_message, MESSAGE_LIMIT},
};

/// Outbound side of the gateway: plain text to a channel or to a user's DMs.
pub struct DiscordClient {
    http: Arc<Http>,
}

impl DiscordClient {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

impl ChatClient for DiscordClient {
    async fn send_message(&self, channel_id: u64, message: &str) -> BotResult<()> {
        let channel = ChannelId::new(channel_id);
        for chunk in split_message(message, MESSAGE_LIMIT) {
            channel.say(self.http.as_ref(), chunk).await?;
        }
        Ok(())
    }

    async fn send_direct(&self, user_id: u64, message: &str) -> BotResult<()> {
        let user = UserId::new(user_id);
        for chunk in split_message(message, MESSAGE_LIMIT) {
            user.direct_message(self.http.as_ref(), CreateMessage::new().content(chunk)).await?;
        }
        Ok(())
    }
}

pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

/// Inbound side: turns gateway messages into [`ChatEvent`]s for the event loop.
pub struct Handler {
    pub tx: UnboundedSender<ChatEvent>,
    pub clock: Arc<dyn Clock>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let event = map_message(&ctx, &msg, self.clock.as_ref()).await;
        if self.tx.send(event).is_err() {
            warn!("Event loop is gone, dropping message");
        }
    }
}

async fn map_message(ctx: &Context, msg: &Message, clock: &dyn Clock) -> ChatEvent {
    // DMs have no name; the handler refuses them before the name matters.
    let channel_name = msg.channel_id.name(ctx).await.unwrap_or_default();

    let voice_channel = msg.guild(&ctx.cache).and_then(|guild| {
        guild
            .voice_states
            .get(&msg.author.id)
            .and_then(|voice| voice.channel_id)
            .map(|channel| channel.get())
    });

    ChatEvent {
        channel: ChatChannel { id: msg.channel_id.get(), name: channel_name },
        user: ChatUser { id: msg.author.id.get(), name: msg.author.name.clone() },
        message: msg.content.clone(),
        timestamp: clock.now(),
        guild_id: msg.guild_id.map(|guild| guild.get()),
        voice_channel,
    }
}
