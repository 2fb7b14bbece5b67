use std::{collections::HashMap, sync::Arc};

use crate::bot::commands::commands::CommandT;

pub mod admin;
pub mod aliases;
pub mod commands;
pub mod general;
pub mod soundboard;

pub struct CommandGroup {
    pub name: String,
    pub commands: Vec<Arc<dyn CommandT>>,
}

/// All handlers the bot ships with, keyed by canonical name. Which aliases
/// reach them is up to the config file.
pub struct CommandRegistry {
    pub commands: HashMap<String, Arc<dyn CommandT>>,
}
