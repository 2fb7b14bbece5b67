use std::sync::Arc;

use tracing::{info, warn};

use crate::bot::{
    commands::{
        commands::{CommandT, FnCommand},
        CommandGroup,
    },
    config::loader::parse_flag,
    replies::Replies,
};

pub const RECONFIG: &str = "reconfig";
pub const RESTART: &str = "restart";
pub const MAINTENANCE: &str = "maintenance";
pub const SET_SPAM_TIMER: &str = "set-spam-timer";
pub const DUMP_SPAM_STATUS: &str = "dump-spam-status";
pub const SHOW_ADMINS: &str = "show-admins";

lazy_static::lazy_static! {
    pub static ref ADMIN_COMMANDS: Arc<CommandGroup> = Arc::new(CommandGroup {
        name: "admin".into(),
        commands: vec![
            reconfig_command(),
            restart_command(),
            maintenance_command(),
            set_spam_timer_command(),
            dump_spam_status_command(),
            show_admins_command(),
        ],
    });
}

pub fn reconfig_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        |invocation, event, state| {
            Box::pin(async move {
                match state.reload().await {
                    Ok(()) => Ok(Some(Replies::config_reloaded(&event.user.mention()))),
                    Err(e) => {
                        warn!(user = %invocation.user, error = %e, "Reload rejected, keeping previous configuration");
                        Ok(Some(Replies::config_reload_failed(&e.to_string())))
                    }
                }
            })
        },
        "Reload the configuration file",
        "!reconfig",
        RECONFIG,
    ))
}

/// Picks up the config file, then drops and re-opens the gateway session.
pub fn restart_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        |invocation, event, state| {
            Box::pin(async move {
                if let Err(e) = state.reload().await {
                    return Ok(Some(Replies::config_reload_failed(&e.to_string())));
                }
                info!(user = %invocation.user, "Restart requested");
                state.lifecycle.request_restart();
                Ok(Some(Replies::restarting(&event.user.mention())))
            })
        },
        "Reload the configuration and reconnect",
        "!restart",
        RESTART,
    ))
}

pub fn maintenance_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        |invocation, _event, state| {
            Box::pin(async move {
                let flag = state.resolver.maintenance();
                let args = invocation.arg_list();

                let reply = match args.as_slice() {
                    [] => Replies::maintenance(flag.toggle()),
                    ["status"] => Replies::maintenance_status(flag.is_on()),
                    [value] => match parse_flag(value) {
                        Some(on) => {
                            flag.set(on);
                            Replies::maintenance(on)
                        }
                        None => Replies::maintenance_usage(&state.resolver.snapshot().prefix, &invocation.alias),
                    },
                    _ => Replies::maintenance_usage(&state.resolver.snapshot().prefix, &invocation.alias),
                };
                info!(user = %invocation.user, on = flag.is_on(), "Maintenance mode");
                Ok(Some(reply))
            })
        },
        "Toggle, set or show maintenance mode",
        "!maintenance [on|off|status]",
        MAINTENANCE,
    ))
}

pub fn set_spam_timer_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        |invocation, _event, state| {
            Box::pin(async move {
                let args = invocation.arg_list();
                let seconds = match args.as_slice() {
                    [value] => value.parse::<u64>().ok(),
                    _ => None,
                };

                let Some(seconds) = seconds else {
                    return Ok(Some(Replies::spam_timer_usage(&state.resolver.snapshot().prefix, &invocation.alias)));
                };

                state.resolver.limiter().set_interval(seconds);
                info!(user = %invocation.user, seconds, "Spam interval changed");
                Ok(Some(Replies::spam_timer_set(seconds)))
            })
        },
        "Set how long users wait between commands",
        "!set-spam-timer <seconds>",
        SET_SPAM_TIMER,
    ))
}

pub fn dump_spam_status_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        |_invocation, _event, state| {
            Box::pin(async move {
                let now = state.clock.now();
                let entries = state.resolver.limiter().dump_all(now);
                Ok(Some(Replies::spam_status(now.timestamp(), &entries)))
            })
        },
        "Show who is cooling down",
        "!dump-spam-status",
        DUMP_SPAM_STATUS,
    ))
}

pub fn show_admins_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        |_invocation, _event, state| {
            Box::pin(async move {
                let snapshot = state.resolver.snapshot();
                Ok(Some(Replies::admins(&snapshot.privileges.list_admins())))
            })
        },
        "List the admins",
        "!show-admins",
        SHOW_ADMINS,
    ))
}
