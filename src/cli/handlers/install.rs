// src/cli/handlers/install.rs

use anyhow::Result;
use clap::Parser;

use super::commons::{self, AppContext};
use crate::core::version_state::Action;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct InstallArgs {
    /// The candidate, e.g. `java`.
    candidate: String,
    /// The version identifier, e.g. `21.0.2-tem`. Detected JDKs are registered.
    version: String,
    /// Do not ask for confirmation.
    #[arg(short, long)]
    yes: bool,
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let install_args = InstallArgs::try_parse_from(&args)?;
    commons::load_catalog(ctx)?;
    commons::run_version_action(
        ctx,
        &install_args.candidate,
        &install_args.version,
        Action::Install,
        install_args.yes,
    )
}
