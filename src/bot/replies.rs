use std::time::Duration;

use crate::bot::dispatcher::dispatcher::Rejection;

/// Discord refuses messages longer than this many characters.
pub const MESSAGE_LIMIT: usize = 2000;

pub struct Replies;

impl Replies {
    /// What to tell a user whose command was refused. Unknown commands stay
    /// silent; ordinary chat hits that case all the time.
    pub fn rejection(user: &str, reason: &Rejection) -> Option<String> {
        match reason {
            Rejection::UnknownCommand => None,
            Rejection::Ambiguous(aliases) => Some(format!("{}, which of {} do you mean?", user, aliases.join(" "))),
            Rejection::InsufficientPrivilege => Some(format!("{}, you need to be an admin to use that command", user)),
            Rejection::MaintenanceActive => Some(format!("{}, I'm in maintenance mode, only admins can use commands right now", user)),
            Rejection::RateLimited(remaining) => Some(format!(
                "{} Spam protection - I can't respond to your messages for approximately {} seconds",
                user,
                whole_seconds(*remaining)
            )),
        }
    }

    pub fn not_a_text_channel(user: &str) -> String {
        format!("{}, I can't receive commands here because it's not a server text channel", user)
    }

    pub fn channel_not_authorized(user: &str, channel: &str) -> String {
        format!("{} I can't receive commands in channel {}", user, channel)
    }

    pub fn command_failed(user: &str, command: &str) -> String {
        format!("{}, something went wrong running {}", user, command)
    }

    pub fn d20(user: &str, roll: u32) -> String {
        format!("{} rolled a d20 and got {}", user, roll)
    }

    pub fn help_overview(prefix: &str, commands: &[&str], admin_commands: &[&str]) -> String {
        let list = |aliases: &[&str]| aliases.iter().map(|alias| format!("{prefix}{alias}")).collect::<Vec<_>>().join(", ");
        format!(
            "All commands must be prefixed with {}.\nCommands: {}.\nAdmin commands: {}",
            prefix,
            list(commands),
            list(admin_commands)
        )
    }

    pub fn no_such_user_command(keyword: &str) -> String {
        format!("No such user command {}", keyword)
    }

    pub fn no_help(keyword: &str) -> String {
        format!("No help for {}", keyword)
    }

    pub fn not_in_voice(user: &str) -> String {
        format!("{} I'm not in a voice channel (try leave-voice and join-me?)", user)
    }

    pub fn single_word(user: &str) -> String {
        format!("{} I'm only expecting a single word to follow that command.", user)
    }

    pub fn nothing_to_play(user: &str) -> String {
        format!("{} Did you specify something to play?", user)
    }

    pub fn no_file(user: &str, keyword: &str) -> String {
        format!("{} No file for {}", user, keyword)
    }

    pub fn playlist_header(user: &str, prefix: &str, play_alias: &str) -> String {
        format!("{} Here are the files for {}{}:", user, prefix, play_alias)
    }

    pub fn play_unavailable(user: &str) -> String {
        format!("{}: The play command is not available", user)
    }

    pub fn must_be_in_server(user: &str) -> String {
        format!("{}, you must be in a server", user)
    }

    pub fn must_be_in_voice(user: &str) -> String {
        format!("{}, you must be in a voice channel", user)
    }

    pub fn not_connected(user: &str) -> String {
        format!("{}, I'm not connected to voice", user)
    }

    pub fn expected_single_argument(user: &str) -> String {
        format!("{} Expected a single argument", user)
    }

    pub fn keyword_not_alphanumeric(user: &str) -> String {
        format!("{} The file named for the command must be alphanumeric only", user)
    }

    pub fn keyword_taken(user: &str, keyword: &str) -> String {
        format!("{} the keyword {} is already taken", user, keyword)
    }

    pub fn manifest_missing(user: &str) -> String {
        format!("{} file to add must be in the add subdir", user)
    }

    pub fn sound_outside_add_dir(user: &str) -> String {
        format!("{} sound to add must be in the add subdir", user)
    }

    pub fn sound_missing(user: &str, file: &str) -> String {
        format!("{} there is no sound file named {} in the add subdir", user, file)
    }

    pub fn sound_exists(user: &str, keyword: &str) -> String {
        format!("{} that sound file already exists. I'm assigning {} to it.", user, keyword)
    }

    pub fn sound_added(user: &str) -> String {
        format!("{} sound added", user)
    }

    pub fn config_reloaded(user: &str) -> String {
        format!("{}, config reloaded", user)
    }

    pub fn config_reload_failed(error: &str) -> String {
        format!("Unable to reload config: {}", error)
    }

    pub fn restarting(user: &str) -> String {
        format!("{}, restarting", user)
    }

    pub fn maintenance(on: bool) -> String {
        if on { "Maintenance mode on".to_string() } else { "Maintenance mode off".to_string() }
    }

    pub fn maintenance_status(on: bool) -> String {
        format!("Maintenance mode: {}", on)
    }

    pub fn maintenance_usage(prefix: &str, alias: &str) -> String {
        format!("Usage: {}{} [on|off|status]", prefix, alias)
    }

    pub fn spam_timer_set(seconds: u64) -> String {
        format!("Spam timer set to {} seconds", seconds)
    }

    pub fn spam_timer_usage(prefix: &str, alias: &str) -> String {
        format!("Usage: {}{} <seconds>", prefix, alias)
    }

    pub fn spam_status(now: i64, entries: &[(String, Duration)]) -> String {
        let mut reply = format!("Current time: {} Current spam protection status:", now);
        if entries.is_empty() {
            reply.push_str("\nnobody is cooling down");
        }
        for (user, remaining) in entries {
            reply.push_str(&format!("\n{}: {}s", user, whole_seconds(*remaining)));
        }
        reply
    }

    pub fn admins(admins: &[&str]) -> String {
        admins.join(", ")
    }
}

/// Seconds, rounded up so "0 seconds" is never shown while still blocked.
pub fn whole_seconds(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

/// Splits a reply into messages no longer than `limit` characters, breaking
/// between lines where possible.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let mut line = line.to_string();
        // A single line over the limit gets cut hard.
        while line.chars().count() > limit {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let cut = line.char_indices().nth(limit).map(|(index, _)| index).unwrap_or(line.len());
            chunks.push(line[..cut].to_string());
            line = line[cut..].to_string();
        }

        let needed = if current.is_empty() { line.chars().count() } else { current.chars().count() + 1 + line.chars().count() };
        if needed > limit {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(&line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
