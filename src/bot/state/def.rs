use std::{collections::BTreeMap, io, path::PathBuf, sync::Arc};

use parking_lot::RwLock;
use thiserror::Error;

use crate::bot::{
    audio::{library::SoundLibrary, player::AudioPlayer},
    commands::{aliases::AliasTable, CommandRegistry},
    config::loader::ConfigError,
    dispatcher::dispatcher::Resolver,
    permissions::permissions::PrivilegeRegistry,
    ratelimit::clock::Clock,
    runtime::lifecycle::Lifecycle,
};

pub struct AppState {
    pub config_path: PathBuf,
    pub resolver: Resolver,
    pub registry: Arc<CommandRegistry>,
    pub sounds: RwLock<SoundLibrary>,
    pub player: Arc<dyn AudioPlayer>,
    pub clock: Arc<dyn Clock>,
    pub lifecycle: Lifecycle,
    /// Held for a whole reload so the snapshot and sounds come from one file read.
    pub reload_lock: tokio::sync::Mutex<()>,
}

/// Everything command resolution reads from configuration, frozen into one
/// value so a reload can replace it in a single swap.
#[derive(Debug, Clone)]
pub struct CommandSnapshot {
    pub prefix: String,
    /// Commands are only taken from channels whose name contains this.
    pub channel_filter: String,
    /// Allow `!!air` to match alias `!!` followed by `air`.
    pub prefix_matching: bool,
    pub aliases: AliasTable,
    pub privileges: PrivilegeRegistry,
    pub helps: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum BotError {
    #[error("JSON deserialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),
    #[error("Configuration invalid: {0}")]
    Config(#[from] ConfigError),
    #[error("Not connected to a voice channel")]
    NotInVoice,
    #[error("{0}")]
    Custom(String),
}
