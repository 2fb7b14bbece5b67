//! Reads the JSON config file and turns it into a validated
//! [`CommandSnapshot`] plus the sound library.
//!
//! The file is a set of flat string maps, one per section:
//!
//! ```json
//! {
//!   "config": { "prefix": "!", "path": "sounds", "channel_filter": "bot", "spam_interval": "3" },
//!   "admins": { "admins": "alice,bob" },
//!   "commands": { "play": "play,p", "d20": "DISABLED", "...": "..." },
//!   "priv_commands": { "restart": "restart", "...": "..." },
//!   "helps": { "play": "{cmd} <sound>: play a sound" },
//!   "files": { "air": "airhorn.mp3" }
//! }
//! ```
//!
//! Nothing here touches live state. A config that fails validation never
//! reaches the resolver.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::bot::{
    audio::library::SoundLibrary,
    commands::{admin::commands::RESTART, aliases::AliasTable},
    dispatcher::dispatcher::fold_case,
    permissions::permissions::PrivilegeRegistry,
    state::def::CommandSnapshot,
};

/// Value that switches a command off instead of giving it aliases.
pub const CMD_DISABLED: &str = "DISABLED";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_CHANNEL_FILTER: &str = "bot";
pub const DEFAULT_SPAM_INTERVAL: u64 = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read {path}: {source}")]
    Unreadable { path: String, source: std::io::Error },
    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("missing configuration key '{key}' in section '{section}'")]
    MissingKey { section: &'static str, key: &'static str },
    #[error("the command prefix must not be empty")]
    EmptyPrefix,
    #[error("invalid spam interval '{0}', expected whole seconds")]
    InvalidInterval(String),
    #[error("invalid value '{value}' for '{key}', expected true or false")]
    InvalidFlag { key: &'static str, value: String },
    #[error("command key {0} is present in both commands and priv_commands")]
    DuplicateCommand(String),
    #[error("missing expected command key '{0}'. If you meant to disable it, use '{0} = DISABLED'")]
    MissingCommand(String),
    #[error("unexpected command key '{0}'. Remove it or check its spelling")]
    UnexpectedCommand(String),
    #[error("command '{0}' has no aliases")]
    NoAliases(String),
    #[error("alias '{alias}' is used by both {first} and {second}")]
    DuplicateAlias { alias: String, first: String, second: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    pub config: BTreeMap<String, String>,
    pub admins: BTreeMap<String, String>,
    pub commands: BTreeMap<String, String>,
    pub priv_commands: BTreeMap<String, String>,
    #[serde(default)]
    pub helps: BTreeMap<String, String>,
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub snapshot: CommandSnapshot,
    pub sounds: SoundLibrary,
    /// Only used at startup; a reload keeps whatever interval is live.
    pub spam_interval: u64,
}

pub async fn load_config(path: &Path, known_commands: &[&str]) -> Result<LoadedConfig, ConfigError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|source| ConfigError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;

    let raw: RawConfig = serde_json::from_str(&content)?;
    let loaded = raw.validate(known_commands)?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(loaded)
}

/// Accepts the usual spellings of a yes/no switch.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn required<'a>(
    section: &'a BTreeMap<String, String>,
    section_name: &'static str,
    key: &'static str,
) -> Result<&'a str, ConfigError> {
    section
        .get(key)
        .map(String::as_str)
        .ok_or(ConfigError::MissingKey { section: section_name, key })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn fold_keys(section: BTreeMap<String, String>) -> BTreeMap<String, String> {
    section.into_iter().map(|(key, value)| (fold_case(key.trim()), value)).collect()
}

impl RawConfig {
    pub fn validate(self, known_commands: &[&str]) -> Result<LoadedConfig, ConfigError> {
        let prefix = required(&self.config, "config", "prefix")?.to_string();
        if prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        let sound_directory = PathBuf::from(required(&self.config, "config", "path")?);
        let admins = split_list(required(&self.admins, "admins", "admins")?);

        let channel_filter = self
            .config
            .get("channel_filter")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CHANNEL_FILTER.to_string());

        let spam_interval = match self.config.get("spam_interval") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidInterval(value.clone()))?,
            None => DEFAULT_SPAM_INTERVAL,
        };

        let prefix_matching = match self.config.get("prefix_matching") {
            Some(value) => parse_flag(value).ok_or_else(|| ConfigError::InvalidFlag {
                key: "prefix_matching",
                value: value.clone(),
            })?,
            None => false,
        };

        let commands = fold_keys(self.commands);
        let priv_commands = fold_keys(self.priv_commands);

        if let Some(key) = commands.keys().find(|key| priv_commands.contains_key(*key)) {
            return Err(ConfigError::DuplicateCommand(key.clone()));
        }

        for name in known_commands {
            if !commands.contains_key(*name) && !priv_commands.contains_key(*name) {
                return Err(ConfigError::MissingCommand(name.to_string()));
            }
        }

        if let Some(key) = commands
            .keys()
            .chain(priv_commands.keys())
            .find(|key| !known_commands.contains(&key.as_str()))
        {
            return Err(ConfigError::UnexpectedCommand(key.clone()));
        }

        let mut mapping: Vec<(String, Vec<String>)> = Vec::new();
        let mut privileged = BTreeSet::new();
        let mut owner: HashMap<String, String> = HashMap::new();

        for (section, is_privileged) in [(&priv_commands, true), (&commands, false)] {
            for (command, value) in section {
                if value.trim() == CMD_DISABLED {
                    info!(command = %command, "Disabled command");
                    continue;
                }

                let aliases: Vec<String> = split_list(value).iter().map(|alias| fold_case(alias)).collect();
                if aliases.is_empty() {
                    return Err(ConfigError::NoAliases(command.clone()));
                }

                for alias in &aliases {
                    if let Some(first) = owner.insert(alias.clone(), command.clone()) {
                        if first != *command {
                            return Err(ConfigError::DuplicateAlias {
                                alias: alias.clone(),
                                first,
                                second: command.clone(),
                            });
                        }
                    }
                }

                if is_privileged {
                    privileged.insert(command.clone());
                }
                mapping.push((command.clone(), aliases));
            }
        }

        // Never let a config lock admins out of restarting the bot.
        if known_commands.contains(&RESTART) && !mapping.iter().any(|(command, _)| command == RESTART) {
            if let Some(first) = owner.get(RESTART) {
                return Err(ConfigError::DuplicateAlias {
                    alias: RESTART.to_string(),
                    first: first.clone(),
                    second: RESTART.to_string(),
                });
            }
            warn!("Re-adding restart command to privileged commands to avoid lockout");
            privileged.insert(RESTART.to_string());
            mapping.push((RESTART.to_string(), vec![RESTART.to_string()]));
        }

        let aliases = AliasTable::from_mapping(mapping);
        let privileges = PrivilegeRegistry::new(admins, privileged);
        let sounds = SoundLibrary::new(sound_directory, fold_keys(self.files));

        info!(
            admins = %privileges.list_admins().join(", "),
            aliases = aliases.len(),
            sounds = sounds.len(),
            "Validated configuration"
        );

        Ok(LoadedConfig {
            snapshot: CommandSnapshot {
                prefix,
                channel_filter,
                prefix_matching,
                aliases,
                privileges,
                helps: fold_keys(self.helps),
            },
            sounds,
            spam_interval,
        })
    }
}
