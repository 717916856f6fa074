// src/cli/handlers/selfupdate.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;

use super::commons::{self, AppContext};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct SelfUpdateArgs {}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    SelfUpdateArgs::try_parse_from(&args)?;
    commons::load_catalog(ctx)?;

    let status = ctx.controller.status();
    if !status.tool_installed {
        return Err(anyhow!(t!("selfupdate.error.not_installed")));
    }
    if !status.update_available {
        println!("{}", t!("selfupdate.info.up_to_date").green());
        return Ok(());
    }

    let events = ctx.controller.subscribe();
    ctx.controller.update_tool()?;
    println!("{}", t!("selfupdate.info.updating").dimmed());
    if commons::settle(ctx) {
        commons::take_failure(&events)?;
        let version = ctx.controller.status().tool_version.unwrap_or_default();
        println!(
            "{}",
            format!(t!("selfupdate.success"), version = version).green().bold()
        );
    }
    Ok(())
}
