use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::bot::{commands::commands::BotResult, state::def::BotError};

/// How long `TracingPlayer` pretends a clip runs. Soundboard clips are short.
pub const NOMINAL_CLIP_LENGTH: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Started,
    /// Something is already playing; the request was dropped.
    AlreadyPlaying,
}

/// Voice side of the bot. Implementations own the voice connection.
pub trait AudioPlayer: Send + Sync {
    /// `(guild, channel)` currently joined, if any.
    fn connected_channel(&self) -> Option<(u64, u64)>;
    fn join(&self, guild_id: u64, channel_id: u64) -> BotResult<()>;
    /// Returns whether there was a connection to leave.
    fn leave(&self) -> BotResult<bool>;
    fn play(&self, file: &Path) -> BotResult<PlayOutcome>;
    fn stop(&self);
}

#[derive(Debug, Default)]
struct VoiceState {
    channel: Option<(u64, u64)>,
    playing_until: Option<Instant>,
    last_played: Option<PathBuf>,
}

impl VoiceState {
    fn is_playing(&self, now: Instant) -> bool {
        self.playing_until.is_some_and(|until| now < until)
    }
}

/// Keeps track of where the bot would be and what it would play, and logs
/// it. Each clip counts as playing for `clip_length`; no audio leaves the
/// process.
#[derive(Debug)]
pub struct TracingPlayer {
    clip_length: Duration,
    state: Mutex<VoiceState>,
}

impl TracingPlayer {
    pub fn new() -> Self {
        Self::with_clip_length(NOMINAL_CLIP_LENGTH)
    }

    pub fn with_clip_length(clip_length: Duration) -> Self {
        Self { clip_length, state: Mutex::default() }
    }

    #[cfg(test)]
    pub fn last_played(&self) -> Option<PathBuf> {
        self.state.lock().last_played.clone()
    }
}

impl Default for TracingPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioPlayer for TracingPlayer {
    fn connected_channel(&self) -> Option<(u64, u64)> {
        self.state.lock().channel
    }

    fn join(&self, guild_id: u64, channel_id: u64) -> BotResult<()> {
        info!(guild_id, channel_id, "Joining voice channel");
        self.state.lock().channel = Some((guild_id, channel_id));
        Ok(())
    }

    fn leave(&self) -> BotResult<bool> {
        let mut state = self.state.lock();
        state.playing_until = None;
        let previous = state.channel.take();
        if let Some((guild_id, channel_id)) = previous {
            info!(guild_id, channel_id, "Left voice channel");
        }
        Ok(previous.is_some())
    }

    fn play(&self, file: &Path) -> BotResult<PlayOutcome> {
        let mut state = self.state.lock();
        if state.channel.is_none() {
            return Err(BotError::NotInVoice);
        }

        let now = Instant::now();
        if state.is_playing(now) {
            debug!(file = %file.display(), "Already playing, dropping request");
            return Ok(PlayOutcome::AlreadyPlaying);
        }

        info!(file = %file.display(), "Playing sound");
        state.playing_until = Some(now + self.clip_length);
        state.last_played = Some(file.to_path_buf());
        Ok(PlayOutcome::Started)
    }

    fn stop(&self) {
        if self.state.lock().playing_until.take().is_some() {
            info!("Stopping playback");
        }
    }
}
