use chrono::{DateTime, Utc};

/// One inbound text message, already stripped of gateway types.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub channel: ChatChannel,
    pub user: ChatUser,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Guild the message was sent in. `None` for direct messages.
    pub guild_id: Option<u64>,
    /// Voice channel the author sits in, when the gateway knows it.
    pub voice_channel: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ChatChannel {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatUser {
    pub id: u64,
    pub name: String,
}

impl ChatUser {
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

impl ChatEvent {
    pub fn is_direct(&self) -> bool {
        self.guild_id.is_none()
    }
}
