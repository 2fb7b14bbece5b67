use std::sync::Arc;

use futures::future::BoxFuture;
use rand::Rng;

use crate::bot::{
    chat_event::chat_event::ChatEvent,
    commands::{
        commands::{BotResult, CommandReply, CommandT, FnCommand},
        CommandGroup,
    },
    dispatcher::dispatcher::{fold_case, CommandInvocation},
    replies::Replies,
    state::def::{AppState, CommandSnapshot},
};

pub const D20: &str = "d20";
pub const HELP: &str = "help";

lazy_static::lazy_static! {
    pub static ref GENERAL_COMMANDS: Arc<CommandGroup> = Arc::new(CommandGroup {
        name: "general".into(),
        commands: vec![
            Arc::new(D20Command) as Arc<dyn CommandT>,
            help_command(),
        ],
    });
}

pub struct D20Command;

impl CommandT for D20Command {
    fn name(&self) -> &str { D20 }
    fn description(&self) -> &str { "Roll a twenty sided die" }
    fn usage(&self) -> &str { "!d20" }

    fn execute(&self, _invocation: CommandInvocation, event: ChatEvent, _state: Arc<AppState>) -> BoxFuture<'static, BotResult<CommandReply>> {
        Box::pin(async move {
            let roll = rand::thread_rng().gen_range(1..=20);
            Ok(Some(Replies::d20(&event.user.mention(), roll)))
        })
    }
}

pub fn help_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        |invocation, _event, state| {
            Box::pin(async move {
                let snapshot = state.resolver.snapshot();
                let keyword = invocation.arg_list().first().map(|arg| fold_case(arg));

                let reply = match keyword {
                    None => overview(&snapshot),
                    Some(keyword) => command_help(&snapshot, &state, &keyword),
                };
                Ok(Some(reply))
            })
        },
        "List commands, or explain one of them",
        "!help [command]",
        HELP,
    ))
}

fn overview(snapshot: &CommandSnapshot) -> String {
    let (admin, everyone): (Vec<_>, Vec<_>) = snapshot
        .aliases
        .list_all()
        .into_iter()
        .partition(|(_, command)| snapshot.privileges.is_privileged(command));

    let everyone: Vec<&str> = everyone.into_iter().map(|(alias, _)| alias).collect();
    let admin: Vec<&str> = admin.into_iter().map(|(alias, _)| alias).collect();

    let mut reply = Replies::help_overview(&snapshot.prefix, &everyone, &admin);
    if let Some(text) = snapshot.helps.get(HELP) {
        reply.push('\n');
        reply.push_str(&fill_placeholder(snapshot, HELP, text));
    }
    reply
}

/// Help is only given for commands everyone can run. `keyword` may be any
/// alias, with or without the prefix.
fn command_help(snapshot: &CommandSnapshot, state: &AppState, keyword: &str) -> String {
    let alias = keyword.strip_prefix(snapshot.prefix.as_str()).unwrap_or(keyword);
    let Some(command) = snapshot.aliases.resolve(alias).filter(|command| !snapshot.privileges.is_privileged(command)) else {
        return Replies::no_such_user_command(keyword);
    };

    if let Some(text) = snapshot.helps.get(command) {
        return fill_placeholder(snapshot, command, text);
    }

    match state.registry.get(command) {
        Some(handler) => format!("{}: {}", handler.usage(), handler.description()),
        None => Replies::no_help(keyword),
    }
}

/// Replaces `{cmd}` with every prefixed alias of `command`.
fn fill_placeholder(snapshot: &CommandSnapshot, command: &str, text: &str) -> String {
    let aliases = snapshot
        .aliases
        .aliases_for(command)
        .iter()
        .map(|alias| format!("{}{}", snapshot.prefix, alias))
        .collect::<Vec<_>>()
        .join(" or ");
    text.replace("{cmd}", &aliases)
}
