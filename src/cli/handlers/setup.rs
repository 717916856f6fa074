// src/cli/handlers/setup.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use super::commons::{self, AppContext};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct SetupArgs {
    /// Do not ask for confirmation.
    #[arg(short, long)]
    yes: bool,
}

/// Installs SDKMAN! itself when it is missing.
pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let setup_args = SetupArgs::try_parse_from(&args)?;
    commons::load_catalog(ctx)?;

    let status = ctx.controller.status();
    if status.tool_installed {
        let version = status.tool_version.unwrap_or_default();
        println!(
            "{}",
            format!(t!("setup.info.already_installed"), version = version).green()
        );
        return Ok(());
    }

    if !commons::confirm(ctx, t!("setup.prompt.install"), setup_args.yes)? {
        println!("{}", t!("common.info.operation_cancelled"));
        return Ok(());
    }

    let events = ctx.controller.subscribe();
    ctx.controller.install_tool()?;
    println!("{}", t!("setup.info.installing").dimmed());
    if commons::settle(ctx) {
        commons::take_failure(&events)?;
        println!("{}", t!("setup.success").green().bold());
    }
    Ok(())
}
