// src/cli/handlers/make_default.rs

use anyhow::Result;
use clap::Parser;

use super::commons::{self, AppContext};
use crate::core::version_state::Action;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct DefaultArgs {
    /// The candidate, e.g. `java`.
    candidate: String,
    /// The installed version to use by default.
    version: String,
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let default_args = DefaultArgs::try_parse_from(&args)?;
    commons::load_catalog(ctx)?;
    commons::run_version_action(
        ctx,
        &default_args.candidate,
        &default_args.version,
        Action::SetDefault,
        true,
    )
}
