// src/cli/handlers/tray.rs

//! Interactive stand-in for the tray icon: a menu loop over the candidates,
//! with the busy indicator animating on stderr while actions run.

use anyhow::Result;
use clap::Parser;
use colored::*;
use dialoguer::{Select, theme::ColorfulTheme};
use std::io::Write;
use std::time::Duration;

use super::commons::{self, AppContext};
use crate::core::{
    indicator::BusyIndicator,
    menu::{CandidateMenu, TrayMenu},
};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct TrayArgs {}

/// One entry of the root menu.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Choice {
    Candidate(String),
    FlushArchives,
    Update,
    Refresh,
    Quit,
}

fn root_choices(menu: &TrayMenu) -> Vec<(String, Choice)> {
    let mut choices: Vec<(String, Choice)> = menu
        .installed
        .iter()
        .chain(menu.available.iter())
        .map(|candidate| (candidate.label.clone(), Choice::Candidate(candidate.id.clone())))
        .collect();
    if let Some(archives) = &menu.archives {
        choices.push((archives.clone(), Choice::FlushArchives));
    }
    if menu.update_available {
        choices.push((t!("tray.menu.update").to_string(), Choice::Update));
    }
    choices.push((t!("tray.menu.refresh").to_string(), Choice::Refresh));
    choices.push((t!("tray.menu.quit").to_string(), Choice::Quit));
    choices
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    TrayArgs::try_parse_from(&args)?;

    let indicator = BusyIndicator::start(
        ctx.controller.gate(),
        Duration::from_millis(ctx.config.indicator_frame_millis),
        // Cursor goes back to column 0 so whatever prints next covers the frame.
        |frame| {
            eprint!("\r{} \r", frame);
            std::io::stderr().flush().ok();
        },
    )?;

    commons::load_catalog(ctx)?;
    loop {
        let menu = ctx.controller.menu();
        println!("\n{}", menu.status.bold());
        let choices = root_choices(&menu);
        let labels: Vec<&str> = choices.iter().map(|(label, _)| label.as_str()).collect();

        let picked = {
            let _pause = indicator.pause();
            Select::with_theme(&ColorfulTheme::default())
                .with_prompt(t!("tray.prompt.root"))
                .items(&labels)
                .default(0)
                .interact_opt()?
        };
        let Some(index) = picked else {
            break;
        };
        let Some((_, choice)) = choices.get(index) else {
            continue;
        };

        let outcome = match choice {
            Choice::Candidate(id) => match menu.installed.iter().chain(menu.available.iter()).find(|c| &c.id == id) {
                Some(candidate) => candidate_menu(ctx, &indicator, candidate),
                None => Ok(()),
            },
            Choice::FlushArchives => {
                let events = ctx.controller.subscribe();
                ctx.controller.flush_archives()?;
                if commons::settle(ctx) {
                    commons::take_failure(&events)
                } else {
                    Ok(())
                }
            }
            Choice::Update => {
                let events = ctx.controller.subscribe();
                ctx.controller.update_tool()?;
                if commons::settle(ctx) {
                    commons::take_failure(&events)
                } else {
                    Ok(())
                }
            }
            Choice::Refresh => commons::load_catalog(ctx),
            Choice::Quit => break,
        };
        // A failed action is shown; the menu stays open.
        if let Err(e) = outcome {
            eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        }
    }

    indicator.stop();
    Ok(())
}

/// Version, then action, for one candidate.
fn candidate_menu(ctx: &AppContext, indicator: &BusyIndicator, candidate: &CandidateMenu) -> Result<()> {
    if candidate.versions.is_empty() {
        println!("{}", t!("list.info.no_versions").dimmed());
        return Ok(());
    }
    let labels: Vec<&str> = candidate.versions.iter().map(|v| v.label.as_str()).collect();
    let picked = {
        let _pause = indicator.pause();
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(&candidate.label)
            .items(&labels)
            .default(0)
            .interact_opt()?
    };
    let Some(index) = picked else {
        return Ok(());
    };
    let Some(version) = candidate.versions.get(index) else {
        return Ok(());
    };

    let actions: Vec<&str> = version.actions.iter().map(|a| a.label()).collect();
    let picked = {
        let _pause = indicator.pause();
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(&version.label)
            .items(&actions)
            .default(0)
            .interact_opt()?
    };
    let Some(index) = picked else {
        return Ok(());
    };
    let Some(action) = version.actions.get(index) else {
        return Ok(());
    };
    match action.action() {
        Some(transition) => {
            commons::run_version_action(ctx, &candidate.id, &version.identifier, transition, false)
        }
        None => commons::run_native_image(ctx, &candidate.id, &version.identifier),
    }
}
