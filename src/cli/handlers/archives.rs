// src/cli/handlers/archives.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;

use super::commons::{self, AppContext};
use crate::core::{menu, version_state::Action};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct ArchivesArgs {
    /// Delete every cached archive.
    #[arg(long, conflicts_with = "remove")]
    flush: bool,
    /// Delete the archive of one version that is not installed.
    #[arg(long, num_args = 2, value_names = ["CANDIDATE", "VERSION"])]
    remove: Option<Vec<String>>,
    /// Do not ask for confirmation.
    #[arg(short, long)]
    yes: bool,
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let archives_args = ArchivesArgs::try_parse_from(&args)?;
    commons::load_catalog(ctx)?;

    if let Some(target) = archives_args.remove {
        let [candidate, version] = target.as_slice() else {
            return Err(anyhow!(t!("archives.error.remove_usage")));
        };
        return commons::run_version_action(ctx, candidate, version, Action::RemoveArchive, true);
    }

    let size = ctx.controller.status().archives_size_bytes;
    if archives_args.flush {
        if size == 0 {
            println!("{}", t!("archives.info.nothing_to_flush"));
            return Ok(());
        }
        let prompt = format!(t!("archives.prompt.flush"), size = menu::format_size(size));
        if !commons::confirm(ctx, &prompt, archives_args.yes)? {
            println!("{}", t!("common.info.operation_cancelled"));
            return Ok(());
        }
        let events = ctx.controller.subscribe();
        ctx.controller.flush_archives()?;
        if commons::settle(ctx) {
            commons::take_failure(&events)?;
            println!("{}", t!("common.success").green().bold());
        }
        return Ok(());
    }

    // --- Report ---
    println!(
        "{}",
        format!(t!("archives.info.total"), size = menu::format_size(size)).bold()
    );
    let lists = ctx.controller.view_lists();
    for id in lists.installed().iter().chain(lists.available().iter()) {
        let Some(candidate) = ctx.controller.candidate(id) else {
            continue;
        };
        for version in candidate.versions.iter().filter(|v| v.archived) {
            println!("  {} {}", candidate.id.cyan(), version.identifier);
        }
    }
    Ok(())
}
