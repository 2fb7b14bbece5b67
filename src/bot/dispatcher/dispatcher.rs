//! Turns raw chat text into an authorized command invocation.
//!
//! The gates run in a fixed order: prefix, alias, privilege, maintenance,
//! cooldown. Cooldown goes last so an attempt that is refused for any other
//! reason never uses up the user's slot.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

use crate::bot::{
    permissions::permissions::PermissionLevel,
    ratelimit::limiter::{Acquire, RateLimiter},
    runtime::maintenance::ModeFlag,
    state::def::CommandSnapshot,
};

/// Longest command text looked at, in characters. Keeps logs sane.
pub const MAX_COMMAND_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    /// Canonical command name.
    pub command: String,
    /// The alias the user actually typed.
    pub alias: String,
    /// Whatever followed the alias, trimmed.
    pub args: String,
    pub user: String,
    pub timestamp: DateTime<Utc>,
}

impl CommandInvocation {
    pub fn arg_list(&self) -> Vec<&str> {
        self.args.split_whitespace().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    UnknownCommand,
    /// Several aliases matched without a space and they disagree.
    Ambiguous(Vec<String>),
    InsufficientPrivilege,
    MaintenanceActive,
    RateLimited(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Plain chat, not addressed to the bot.
    NotACommand,
    Authorized(CommandInvocation),
    Rejected(Rejection),
}

/// Owns the state that decides whether a command runs: the current
/// configuration snapshot, the maintenance flag and the cooldown table.
pub struct Resolver {
    snapshot: RwLock<Arc<CommandSnapshot>>,
    maintenance: ModeFlag,
    limiter: RateLimiter,
}

impl Resolver {
    pub fn new(snapshot: CommandSnapshot, spam_interval: u64) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
            maintenance: ModeFlag::default(),
            limiter: RateLimiter::new(spam_interval),
        }
    }

    /// The configuration generation in effect right now. Hold on to the
    /// returned `Arc` to keep reading one consistent generation.
    pub fn snapshot(&self) -> Arc<CommandSnapshot> {
        self.snapshot.read().clone()
    }

    /// Swaps in a new configuration and hands back the old one. Cooldowns,
    /// the cooldown interval and the maintenance flag are left alone.
    pub fn reconfigure(&self, snapshot: CommandSnapshot) -> Arc<CommandSnapshot> {
        let next = Arc::new(snapshot);
        std::mem::replace(&mut *self.snapshot.write(), next)
    }

    pub fn maintenance(&self) -> &ModeFlag {
        &self.maintenance
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    #[cfg(test)]
    pub fn resolve(&self, user: &str, text: &str, now: DateTime<Utc>) -> Resolution {
        let snapshot = self.snapshot();
        self.resolve_in(&snapshot, user, text, now)
    }

    /// Resolves `text` against a snapshot the caller already holds, so
    /// channel filtering and resolution see the same generation.
    pub fn resolve_in(&self, snapshot: &CommandSnapshot, user: &str, text: &str, now: DateTime<Utc>) -> Resolution {
        let Some(command_text) = command_text(&snapshot.prefix, text) else {
            return Resolution::NotACommand;
        };

        let (command, alias, args) = match lookup(snapshot, &command_text) {
            Ok(found) => found,
            Err(reason) => {
                debug!(user = %user, text = %command_text, ?reason, "Unresolved command");
                return Resolution::Rejected(reason);
            }
        };

        let required = snapshot.privileges.required_level(&command);
        let privileged = required == PermissionLevel::Admin;
        let admin = snapshot.privileges.is_admin(user);

        if !snapshot.privileges.has_permission(user, required) {
            info!(user = %user, command = %command, %required, "Disallow: privileged command from non-admin");
            return Resolution::Rejected(Rejection::InsufficientPrivilege);
        }

        if !privileged && !admin && self.maintenance.is_on() {
            info!(user = %user, command = %command, "Disallow: maintenance mode");
            return Resolution::Rejected(Rejection::MaintenanceActive);
        }

        // Admin actions are never throttled.
        if !privileged {
            if let Acquire::Denied(remaining) = self.limiter.try_acquire(user, now) {
                info!(user = %user, command = %command, "Disallow: user is spam blocked");
                return Resolution::Rejected(Rejection::RateLimited(remaining));
            }
        }

        info!(user = %user, command = %command, alias = %alias, args = %args, "Allow");
        Resolution::Authorized(CommandInvocation {
            command,
            alias,
            args,
            user: user.to_string(),
            timestamp: now,
        })
    }
}

/// NFKC-normalizes and lowercases, so full-width or mixed-case input lines
/// up with the configured aliases.
pub fn fold_case(text: &str) -> String {
    text.nfkc().flat_map(char::to_lowercase).collect()
}

// Text after the prefix: first line only, folded and capped.
fn command_text(prefix: &str, raw: &str) -> Option<String> {
    let rest = raw.strip_prefix(prefix)?;
    let first_line = rest.lines().next().unwrap_or_default();
    let folded: String = fold_case(first_line).chars().take(MAX_COMMAND_CHARS).collect();
    let trimmed = folded.trim();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn split_token(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim()),
        None => (text, ""),
    }
}

fn lookup(snapshot: &CommandSnapshot, text: &str) -> Result<(String, String, String), Rejection> {
    let (token, args) = split_token(text);
    if let Some(command) = snapshot.aliases.resolve(token) {
        return Ok((command.to_string(), token.to_string(), args.to_string()));
    }

    if !snapshot.prefix_matching {
        return Err(Rejection::UnknownCommand);
    }

    // Privileged commands are only ever reached by their exact alias.
    let candidates: Vec<(&str, &str)> = snapshot
        .aliases
        .prefix_matches(text)
        .into_iter()
        .filter(|(_, command)| !snapshot.privileges.is_privileged(command))
        .collect();

    let Some(&(alias, command)) = candidates.iter().max_by_key(|(alias, _)| alias.len()) else {
        return Err(Rejection::UnknownCommand);
    };

    if candidates.iter().any(|(_, other)| *other != command) {
        let aliases = candidates.iter().map(|(alias, _)| alias.to_string()).collect();
        return Err(Rejection::Ambiguous(aliases));
    }

    let args = text[alias.len()..].trim();
    Ok((command.to_string(), alias.to_string(), args.to_string()))
}
