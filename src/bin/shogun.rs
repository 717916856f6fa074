// src/bin/shogun.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use shogun::{
    cli::{Cli, dispatcher, handlers::commons::AppContext},
    core::{config_loader, tray_controller::TrayController},
    system::sdkman::SdkMan,
};
use std::sync::Arc;

/// Sets up logging, loads the configuration, starts the engine and dispatches
/// to the command handler. Errors are printed once, here.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    // 1. Configuration, written with defaults on first run.
    let config = config_loader::load_config().context("Failed to load shogun.toml")?;
    log::debug!("Configuration: {:?}", config);

    // 2. The version manager and the engine driving it.
    let sdkman = SdkMan::from_config(&config)?;
    log::debug!("Using SDKMAN! at '{}'", sdkman.dir().display());
    let controller = TrayController::new(Arc::new(sdkman), &config)?;

    // 3. Dispatch.
    let ctx = AppContext::new(controller, config);
    dispatcher::dispatch(cli.args, &ctx)
}
