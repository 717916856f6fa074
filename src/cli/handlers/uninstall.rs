// src/cli/handlers/uninstall.rs

use anyhow::Result;
use clap::Parser;

use super::commons::{self, AppContext};
use crate::core::version_state::Action;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct UninstallArgs {
    /// The candidate, e.g. `java`.
    candidate: String,
    /// The installed (or locally registered) version to remove.
    version: String,
    /// Do not ask for confirmation.
    #[arg(short, long)]
    yes: bool,
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let uninstall_args = UninstallArgs::try_parse_from(&args)?;
    commons::load_catalog(ctx)?;
    commons::run_version_action(
        ctx,
        &uninstall_args.candidate,
        &uninstall_args.version,
        Action::Uninstall,
        uninstall_args.yes,
    )
}
