// src/cli/dispatcher.rs

use anyhow::{Result, anyhow};

use crate::cli::handlers::{self, commons::AppContext};

// --- Command Definition and Registry ---

/// A command, its aliases and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &AppContext) -> Result<()>,
}

/// Every command of the front end.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "list",
        aliases: &["ls"],
        handler: handlers::list::handle,
    },
    CommandDefinition {
        name: "install",
        aliases: &["i"],
        handler: handlers::install::handle,
    },
    CommandDefinition {
        name: "uninstall",
        aliases: &["rm"],
        handler: handlers::uninstall::handle,
    },
    CommandDefinition {
        name: "default",
        aliases: &["use"],
        handler: handlers::make_default::handle,
    },
    CommandDefinition {
        name: "native-image",
        aliases: &["ni"],
        handler: handlers::native_image::handle,
    },
    CommandDefinition {
        name: "archives",
        aliases: &[],
        handler: handlers::archives::handle,
    },
    CommandDefinition {
        name: "selfupdate",
        aliases: &["update"],
        handler: handlers::selfupdate::handle,
    },
    CommandDefinition {
        name: "setup",
        aliases: &[],
        handler: handlers::setup::handle,
    },
    CommandDefinition {
        name: "tray",
        aliases: &["menu"],
        handler: handlers::tray::handle,
    },
];

/// Command run when none is given.
const DEFAULT_COMMAND: &str = "tray";

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Routes `<command> [args...]` to its handler.
pub fn dispatch(all_args: Vec<String>, ctx: &AppContext) -> Result<()> {
    log::debug!("Dispatching args: {:?}", all_args);

    let mut args = all_args.into_iter();
    let name = args.next().unwrap_or_else(|| DEFAULT_COMMAND.to_string());
    let command = find_command(&name)
        .ok_or_else(|| anyhow!(format!(t!("dispatch.error.unknown_command"), name = name)))?;

    (command.handler)(args.collect(), ctx)
}
