//! Fixtures shared by the unit tests.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::bot::{
    audio::player::TracingPlayer,
    chat_event::chat_event::{ChatChannel, ChatEvent, ChatUser},
    commands::{commands::BotResult, CommandRegistry},
    config::loader::RawConfig,
    dispatcher::dispatcher::{fold_case, CommandInvocation},
    handler::handler::ChatClient,
    ratelimit::clock::ManualClock,
    state::def::AppState,
};

pub const KNOWN: &[&str] = &[
    "d20",
    "play",
    "playlist",
    "stop",
    "add",
    "join-me",
    "leave-voice",
    "help",
    "reconfig",
    "restart",
    "maintenance",
    "set-spam-timer",
    "dump-spam-status",
    "show-admins",
];

pub fn config_json() -> Value {
    json!({
        "config": {
            "prefix": "!",
            "path": "sounds",
            "spam_interval": "5"
        },
        "admins": { "admins": "alice" },
        "commands": {
            "play": "play,p,!!",
            "playlist": "playlist",
            "stop": "stop",
            "d20": "d20,roll",
            "add": "add",
            "join-me": "join-me,join",
            "leave-voice": "leave-voice,leave",
            "help": "help,commands"
        },
        "priv_commands": {
            "restart": "restart,!restart",
            "reconfig": "reconfig",
            "maintenance": "maintenance",
            "set-spam-timer": "set-spam-timer",
            "dump-spam-status": "dump-spam-status",
            "show-admins": "show-admins"
        },
        "helps": {
            "help": "Use {cmd} <command> for details",
            "play": "{cmd} <sound>: play a sound from the playlist"
        },
        "files": {
            "air": "airhorn.mp3",
            "bruh": "bruh.wav"
        }
    })
}

pub fn raw_config() -> RawConfig {
    serde_json::from_value(config_json()).unwrap()
}

pub fn write_config(path: &Path, config: &Value) {
    std::fs::write(path, serde_json::to_string_pretty(config).unwrap()).unwrap();
}

/// A fully wired bot on top of a temporary sound directory.
pub struct TestBot {
    pub state: Arc<AppState>,
    pub player: Arc<TracingPlayer>,
    pub clock: Arc<ManualClock>,
    pub dir: TempDir,
}

impl TestBot {
    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.json")
    }

    pub fn sound_dir(&self) -> PathBuf {
        self.dir.path().join("sounds")
    }

    /// The config the bot was started with, pointing at its own sound directory.
    pub fn config_json(&self) -> Value {
        let mut config = config_json();
        config["config"]["path"] = self.sound_dir().display().to_string().into();
        config
    }
}

pub async fn test_bot() -> TestBot {
    let dir = tempfile::tempdir().unwrap();
    let sounds = dir.path().join("sounds");
    std::fs::create_dir_all(sounds.join("to_add")).unwrap();
    std::fs::write(sounds.join("airhorn.mp3"), b"ID3").unwrap();

    let config_path = dir.path().join("config.json");
    let mut config = config_json();
    config["config"]["path"] = sounds.display().to_string().into();
    write_config(&config_path, &config);

    let player = Arc::new(TracingPlayer::new());
    let clock = Arc::new(ManualClock::at(0));
    let state = AppState::load(config_path, Arc::new(CommandRegistry::new()), player.clone(), clock.clone())
        .await
        .unwrap();

    TestBot { state: Arc::new(state), player, clock, dir }
}

pub async fn test_state() -> (Arc<AppState>, TempDir) {
    let bot = test_bot().await;
    (bot.state, bot.dir)
}

/// A guild text message from `user` in the bot channel, sent while the user
/// sits in voice channel 200.
pub fn event(user: &str, text: &str, timestamp: DateTime<Utc>) -> ChatEvent {
    ChatEvent {
        channel: ChatChannel { id: 10, name: "bot-commands".into() },
        user: ChatUser { id: 1, name: user.into() },
        message: text.into(),
        timestamp,
        guild_id: Some(100),
        voice_channel: Some(200),
    }
}

/// Builds the invocation the resolver would hand out for `text`, without
/// touching cooldowns or privileges.
pub fn invocation(state: &AppState, user: &str, text: &str) -> CommandInvocation {
    let snapshot = state.resolver.snapshot();
    let body = text.strip_prefix(snapshot.prefix.as_str()).unwrap_or(text);
    let (alias, args) = body.split_once(' ').unwrap_or((body, ""));
    let alias = fold_case(alias);

    CommandInvocation {
        command: snapshot.aliases.resolve(&alias).unwrap_or(alias.as_str()).to_string(),
        alias,
        args: args.trim().to_string(),
        user: user.into(),
        timestamp: DateTime::UNIX_EPOCH,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Channel(u64, String),
    Direct(u64, String),
}

#[derive(Default)]
pub struct RecordingClient {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingClient {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }
}

impl ChatClient for RecordingClient {
    async fn send_message(&self, channel_id: u64, message: &str) -> BotResult<()> {
        self.sent.lock().push(Sent::Channel(channel_id, message.to_string()));
        Ok(())
    }

    async fn send_direct(&self, user_id: u64, message: &str) -> BotResult<()> {
        self.sent.lock().push(Sent::Direct(user_id, message.to_string()));
        Ok(())
    }
}
