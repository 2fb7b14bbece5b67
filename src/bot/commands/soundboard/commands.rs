use std::{io::ErrorKind, path::Path, sync::Arc};

use futures::future::BoxFuture;
use tracing::{debug, info};

use crate::bot::{
    audio::{library::is_plain_file_name, player::PlayOutcome},
    chat_event::chat_event::ChatEvent,
    commands::{
        commands::{BotResult, CommandReply, CommandT, FnCommand},
        CommandGroup,
    },
    dispatcher::dispatcher::{fold_case, CommandInvocation},
    replies::Replies,
    state::def::AppState,
};

pub const PLAY: &str = "play";
pub const PLAYLIST: &str = "playlist";
pub const STOP: &str = "stop";
pub const ADD: &str = "add";
pub const JOIN_ME: &str = "join-me";
pub const LEAVE_VOICE: &str = "leave-voice";

lazy_static::lazy_static! {
    pub static ref SOUNDBOARD_COMMANDS: Arc<CommandGroup> = Arc::new(CommandGroup {
        name: "soundboard".into(),
        commands: vec![
            Arc::new(PlayCommand) as Arc<dyn CommandT>,
            playlist_command(),
            stop_command(),
            Arc::new(AddCommand),
            join_me_command(),
            leave_voice_command(),
        ],
    });
}

pub struct PlayCommand;

impl CommandT for PlayCommand {
    fn name(&self) -> &str { PLAY }
    fn description(&self) -> &str { "Play a sound in the voice channel" }
    fn usage(&self) -> &str { "!play <sound>" }

    fn execute(&self, invocation: CommandInvocation, event: ChatEvent, state: Arc<AppState>) -> BoxFuture<'static, BotResult<CommandReply>> {
        Box::pin(async move {
            let mention = event.user.mention();
            let args = invocation.arg_list();
            let keyword = match args.as_slice() {
                [] => return Ok(Some(Replies::nothing_to_play(&mention))),
                [keyword] => fold_case(keyword),
                _ => return Ok(Some(Replies::single_word(&mention))),
            };

            let Some(file) = state.sounds.read().resolve(&keyword) else {
                return Ok(Some(Replies::no_file(&mention, &keyword)));
            };

            if state.player.connected_channel().is_none() {
                let (Some(guild_id), Some(channel_id)) = (event.guild_id, event.voice_channel) else {
                    return Ok(Some(Replies::not_in_voice(&mention)));
                };
                state.player.join(guild_id, channel_id)?;
            }

            if state.player.play(&file)? == PlayOutcome::AlreadyPlaying {
                debug!(user = %invocation.user, keyword = %keyword, "Dropped overlapping play request");
            }
            Ok(None)
        })
    }
}

pub fn playlist_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        |_invocation, event, state| {
            Box::pin(async move {
                let mention = event.user.mention();
                let snapshot = state.resolver.snapshot();

                let Some(play_alias) = snapshot.aliases.aliases_for(PLAY).first().map(|alias| alias.to_string()) else {
                    return Ok(Some(Replies::play_unavailable(&mention)));
                };

                let mut reply = Replies::playlist_header(&mention, &snapshot.prefix, &play_alias);
                for line in state.sounds.read().playlist_lines() {
                    reply.push('\n');
                    reply.push_str(&line);
                }
                Ok(Some(reply))
            })
        },
        "List every sound that can be played",
        "!playlist",
        PLAYLIST,
    ))
}

pub fn stop_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        |_invocation, _event, state| {
            Box::pin(async move {
                state.player.stop();
                Ok(None)
            })
        },
        "Stop whatever is playing",
        "!stop",
        STOP,
    ))
}

pub fn join_me_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        |_invocation, event, state| {
            Box::pin(async move {
                let mention = event.user.mention();
                let Some(guild_id) = event.guild_id else {
                    return Ok(Some(Replies::must_be_in_server(&mention)));
                };
                let Some(channel_id) = event.voice_channel else {
                    return Ok(Some(Replies::must_be_in_voice(&mention)));
                };

                if state.player.connected_channel().is_some() {
                    state.player.leave()?;
                }
                state.player.join(guild_id, channel_id)?;
                Ok(None)
            })
        },
        "Join the voice channel you are in",
        "!join-me",
        JOIN_ME,
    ))
}

pub fn leave_voice_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        |_invocation, event, state| {
            Box::pin(async move {
                if state.player.leave()? {
                    Ok(None)
                } else {
                    Ok(Some(Replies::not_connected(&event.user.mention())))
                }
            })
        },
        "Leave the voice channel",
        "!leave-voice",
        LEAVE_VOICE,
    ))
}

/// `add <keyword>` picks up `<keyword>.txt` from the add subdirectory. Its
/// first line names the sound file, which gets linked into the sound
/// directory and registered under the keyword.
pub struct AddCommand;

impl CommandT for AddCommand {
    fn name(&self) -> &str { ADD }
    fn description(&self) -> &str { "Register a sound waiting in the add folder" }
    fn usage(&self) -> &str { "!add <keyword>" }

    fn execute(&self, invocation: CommandInvocation, event: ChatEvent, state: Arc<AppState>) -> BoxFuture<'static, BotResult<CommandReply>> {
        Box::pin(async move {
            let mention = event.user.mention();
            let args = invocation.arg_list();
            let [keyword] = args.as_slice() else {
                return Ok(Some(Replies::expected_single_argument(&mention)));
            };
            let keyword = fold_case(keyword);

            if !keyword.chars().all(char::is_alphanumeric) {
                return Ok(Some(Replies::keyword_not_alphanumeric(&mention)));
            }

            let (sound_directory, add_directory) = {
                let sounds = state.sounds.read();
                if sounds.contains(&keyword) {
                    return Ok(Some(Replies::keyword_taken(&mention, &keyword)));
                }
                (sounds.directory().to_path_buf(), sounds.add_directory())
            };

            let manifest = match tokio::fs::read_to_string(add_directory.join(format!("{keyword}.txt"))).await {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Some(Replies::manifest_missing(&mention))),
                Err(e) => return Err(e.into()),
            };

            let file = manifest.lines().next().unwrap_or_default().trim().to_string();
            if !is_plain_file_name(&file) {
                return Ok(Some(Replies::sound_outside_add_dir(&mention)));
            }

            let source = add_directory.join(&file);
            if !tokio::fs::try_exists(&source).await? {
                return Ok(Some(Replies::sound_missing(&mention, &file)));
            }

            let already_linked = match link(&source, &sound_directory.join(&file)).await {
                Ok(()) => false,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => true,
                Err(e) => return Err(e.into()),
            };

            if !state.sounds.write().insert_new(&keyword, &file) {
                return Ok(Some(Replies::keyword_taken(&mention, &keyword)));
            }
            info!(keyword = %keyword, file = %file, user = %invocation.user, "Added sound");

            if already_linked {
                Ok(Some(Replies::sound_exists(&mention, &keyword)))
            } else {
                Ok(Some(Replies::sound_added(&mention)))
            }
        })
    }
}

#[cfg(unix)]
async fn link(source: &Path, target: &Path) -> std::io::Result<()> {
    let source = tokio::fs::canonicalize(source).await?;
    tokio::fs::symlink(source, target).await
}

#[cfg(not(unix))]
async fn link(source: &Path, target: &Path) -> std::io::Result<()> {
    if tokio::fs::try_exists(target).await? {
        return Err(std::io::Error::new(ErrorKind::AlreadyExists, "sound file already exists"));
    }
    tokio::fs::copy(source, target).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::{
        audio::player::AudioPlayer,
        ratelimit::clock::at,
        testing::{event, invocation, test_bot, TestBot},
    };

    async fn run(bot: &TestBot, command: Arc<dyn CommandT>, text: &str) -> Option<String> {
        run_event(bot, command, event("bob", text, at(0))).await
    }

    async fn run_event(bot: &TestBot, command: Arc<dyn CommandT>, event: ChatEvent) -> Option<String> {
        let invocation = invocation(&bot.state, "bob", &event.message);
        command.execute(invocation, event, bot.state.clone()).await.unwrap()
    }

    #[tokio::test]
    async fn play_joins_the_callers_channel_and_plays() {
        let bot = test_bot().await;

        assert_eq!(run(&bot, Arc::new(PlayCommand), "!p AIR").await, None);

        assert_eq!(bot.player.connected_channel(), Some((100, 200)));
        assert_eq!(bot.player.last_played(), Some(bot.sound_dir().join("airhorn.mp3")));
    }

    #[tokio::test]
    async fn play_while_playing_is_dropped_silently() {
        let bot = test_bot().await;

        assert_eq!(run(&bot, Arc::new(PlayCommand), "!p air").await, None);
        assert_eq!(run(&bot, Arc::new(PlayCommand), "!p bruh").await, None);
        assert_eq!(bot.player.last_played(), Some(bot.sound_dir().join("airhorn.mp3")));

        assert_eq!(run(&bot, stop_command(), "!stop").await, None);
        assert_eq!(run(&bot, Arc::new(PlayCommand), "!p bruh").await, None);
        assert_eq!(bot.player.last_played(), Some(bot.sound_dir().join("bruh.wav")));
    }

    #[tokio::test]
    async fn play_argument_checks() {
        let bot = test_bot().await;

        let none = run(&bot, Arc::new(PlayCommand), "!p").await.unwrap();
        let many = run(&bot, Arc::new(PlayCommand), "!p air horn").await.unwrap();
        let unknown = run(&bot, Arc::new(PlayCommand), "!p tuba").await.unwrap();

        assert!(none.contains("Did you specify something to play?"), "{none}");
        assert!(many.contains("only expecting a single word"), "{many}");
        assert!(unknown.ends_with("No file for tuba"), "{unknown}");
        assert_eq!(bot.player.last_played(), None);
    }

    #[tokio::test]
    async fn playlist_names_the_play_alias() {
        let bot = test_bot().await;

        let reply = run(&bot, playlist_command(), "!playlist").await.unwrap();
        let mut lines = reply.lines();

        assert_eq!(lines.next(), Some("<@1> Here are the files for !!!:"));
        assert!(reply.contains("\nair: airhorn"), "{reply}");
    }

    #[tokio::test]
    async fn join_me_requires_a_voice_channel() {
        let bot = test_bot().await;

        let mut outside = event("bob", "!join", at(0));
        outside.voice_channel = None;
        let reply = run_event(&bot, join_me_command(), outside).await.unwrap();
        assert!(reply.contains("must be in a voice channel"), "{reply}");

        assert_eq!(run(&bot, join_me_command(), "!join").await, None);
        assert_eq!(bot.player.connected_channel(), Some((100, 200)));
    }

    #[tokio::test]
    async fn leave_voice_reports_when_not_connected() {
        let bot = test_bot().await;

        let reply = run(&bot, leave_voice_command(), "!leave").await.unwrap();
        assert!(reply.contains("not connected"), "{reply}");

        bot.player.join(100, 200).unwrap();
        assert_eq!(run(&bot, leave_voice_command(), "!leave").await, None);
        assert_eq!(bot.player.connected_channel(), None);
    }

    #[tokio::test]
    async fn add_links_and_registers_a_sound() {
        let bot = test_bot().await;
        let add_dir = bot.sound_dir().join("to_add");
        std::fs::write(add_dir.join("tada.txt"), "tada.mp3\n").unwrap();
        std::fs::write(add_dir.join("tada.mp3"), b"ID3").unwrap();

        let reply = run(&bot, Arc::new(AddCommand), "!add Tada").await.unwrap();

        assert!(reply.ends_with("sound added"), "{reply}");
        assert!(bot.sound_dir().join("tada.mp3").exists());
        assert!(bot.state.sounds.read().contains("tada"));
    }

    #[tokio::test]
    async fn add_reuses_an_existing_file() {
        let bot = test_bot().await;
        let add_dir = bot.sound_dir().join("to_add");
        std::fs::write(add_dir.join("horn.txt"), "airhorn.mp3").unwrap();
        std::fs::write(add_dir.join("airhorn.mp3"), b"ID3").unwrap();

        let reply = run(&bot, Arc::new(AddCommand), "!add horn").await.unwrap();

        assert!(reply.contains("already exists. I'm assigning horn to it"), "{reply}");
        assert_eq!(bot.state.sounds.read().resolve("horn"), Some(bot.sound_dir().join("airhorn.mp3")));
    }

    #[tokio::test]
    async fn add_rejects_bad_requests() {
        let bot = test_bot().await;
        let add_dir = bot.sound_dir().join("to_add");
        std::fs::write(add_dir.join("escape.txt"), "../../etc/passwd").unwrap();
        std::fs::write(add_dir.join("ghost.txt"), "ghost.mp3").unwrap();

        let cases = [
            ("!add", "Expected a single argument"),
            ("!add a b", "Expected a single argument"),
            ("!add ../x", "must be alphanumeric only"),
            ("!add air", "the keyword air is already taken"),
            ("!add nothing", "file to add must be in the add subdir"),
            ("!add escape", "sound to add must be in the add subdir"),
            ("!add ghost", "no sound file named ghost.mp3"),
        ];
        for (text, expected) in cases {
            let reply = run(&bot, Arc::new(AddCommand), text).await.unwrap();
            assert!(reply.contains(expected), "{text}: {reply}");
        }
        assert!(!bot.state.sounds.read().contains("ghost"));
    }
}
