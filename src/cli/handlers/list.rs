// src/cli/handlers/list.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;

use super::commons::{self, AppContext};
use crate::core::menu::{CandidateMenu, MenuAction, TrayMenu};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct ListArgs {
    /// Show the versions of this candidate only.
    candidate: Option<String>,
    /// Print the menu model as JSON.
    #[arg(long)]
    json: bool,
    /// Also show the versions of every installed candidate.
    #[arg(short, long)]
    all: bool,
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let list_args = ListArgs::try_parse_from(&args)?;
    commons::load_catalog(ctx)?;
    let menu = ctx.controller.menu();

    match list_args.candidate {
        Some(id) => {
            let candidate = find(&menu, &id)
                .ok_or_else(|| anyhow!(format!(t!("list.error.unknown_candidate"), name = id)))?;
            if list_args.json {
                println!("{}", serde_json::to_string_pretty(candidate)?);
            } else {
                print_candidate(candidate);
            }
        }
        None if list_args.json => println!("{}", serde_json::to_string_pretty(&menu)?),
        None => print_menu(&menu, list_args.all),
    }
    Ok(())
}

fn find<'a>(menu: &'a TrayMenu, id: &str) -> Option<&'a CandidateMenu> {
    menu.installed
        .iter()
        .chain(menu.available.iter())
        .find(|candidate| candidate.id == id)
}

fn actions_hint(actions: &[MenuAction]) -> String {
    actions
        .iter()
        .map(|action| action.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_candidate(candidate: &CandidateMenu) {
    println!("{}", candidate.label.bold());
    if candidate.versions.is_empty() {
        println!("  {}", t!("list.info.no_versions").dimmed());
    }
    for version in &candidate.versions {
        let label = if version.label.starts_with('>') {
            version.label.green().bold()
        } else {
            version.label.normal()
        };
        println!("  {}  {}", label, actions_hint(&version.actions).dimmed());
    }
}

fn print_menu(menu: &TrayMenu, all: bool) {
    // --- Status ---
    println!("{}", menu.status.bold());
    if menu.update_available {
        println!("{}", t!("list.info.update_available").yellow());
    }
    if let Some(archives) = &menu.archives {
        println!("{}", archives.dimmed());
    }

    // --- Installed ---
    println!("\n{}", t!("list.header.installed").green().bold());
    if menu.installed.is_empty() {
        println!("  {}", t!("list.info.none").dimmed());
    }
    for candidate in &menu.installed {
        if all {
            print_candidate(candidate);
        } else {
            println!("  {}", candidate.label.cyan());
        }
    }

    // --- Available ---
    if !menu.available.is_empty() {
        println!("\n{}", t!("list.header.available").green().bold());
        let ids: Vec<&str> = menu.available.iter().map(|c| c.id.as_str()).collect();
        for row in ids.chunks(6) {
            println!("  {}", row.join("  "));
        }
    }
}
