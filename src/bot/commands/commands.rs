use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use crate::bot::{
    chat_event::chat_event::ChatEvent,
    commands::{admin::commands::ADMIN_COMMANDS, general::commands::GENERAL_COMMANDS, soundboard::commands::SOUNDBOARD_COMMANDS, CommandGroup, CommandRegistry},
    dispatcher::dispatcher::CommandInvocation,
    state::def::{AppState, BotError},
};

pub type BotResult<T> = Result<T, BotError>;

/// Reply text a command wants sent back to the channel, if any.
pub type CommandReply = Option<String>;

pub trait CommandT: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn usage(&self) -> &str;

    fn execute(&self, invocation: CommandInvocation, event: ChatEvent, state: Arc<AppState>) -> BoxFuture<'static, BotResult<CommandReply>>;
}

pub struct FnCommand<F> {func: F, desc: String, usage: String, name: String} impl<F> FnCommand<F>
    where
        F: Fn(CommandInvocation, ChatEvent, Arc<AppState>) -> BoxFuture<'static, BotResult<CommandReply>> + Send + Sync + 'static {
    pub fn new(func: F, desc: impl Into<String>, usage: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            func,
            desc: desc.into(),
            usage: usage.into(),
            name: name.into(),
        }
    }
}

impl<F> CommandT for FnCommand<F> where
    F: Fn(CommandInvocation, ChatEvent, Arc<AppState>) -> BoxFuture<'static, BotResult<CommandReply>> + Send + Sync + 'static {
        fn execute(&self, invocation: CommandInvocation, event: ChatEvent, state: Arc<AppState>) -> BoxFuture<'static, BotResult<CommandReply>> {
            (self.func)(invocation, event, state)
        }

        fn name(&self) -> &str { &self.name }
        fn description(&self) -> &str { &self.desc }
        fn usage(&self) -> &str { &self.usage }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::from_groups([GENERAL_COMMANDS.clone(), SOUNDBOARD_COMMANDS.clone(), ADMIN_COMMANDS.clone()])
    }

    pub fn from_groups(groups: impl IntoIterator<Item = Arc<CommandGroup>>) -> Self {
        let mut commands = std::collections::HashMap::new();

        for group in groups {
            for command in &group.commands {
                commands.insert(command.name().to_string(), Arc::clone(command));
            }
            debug!(group = %group.name, commands = group.commands.len(), "Registered command group");
        }

        Self { commands }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CommandT>> {
        self.commands.get(name).cloned()
    }

    /// Canonical names every config file has to mention.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::testing::KNOWN;

    #[test]
    fn registry_knows_every_handler() {
        let registry = CommandRegistry::new();
        let mut expected = KNOWN.to_vec();
        expected.sort_unstable();
        assert_eq!(registry.names(), expected);
        assert_eq!(registry.commands.len(), KNOWN.len());
    }

    #[test]
    fn commands_carry_help_metadata() {
        let registry = CommandRegistry::new();
        let play = registry.get("play").unwrap();
        assert_eq!(play.name(), "play");
        assert!(!play.description().is_empty());
        assert!(play.usage().contains("play"));
        assert!(registry.get("dance").is_none());
    }
}
