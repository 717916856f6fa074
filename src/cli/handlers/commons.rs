// src/cli/handlers/commons.rs

// Shared plumbing for the handlers: waiting for the engine, confirmations and
// turning published failures into errors.

use anyhow::{Result, anyhow};
use colored::Colorize;
use crossbeam_channel::Receiver;
use dialoguer::{Confirm, theme::ColorfulTheme};
use std::time::Duration;

use crate::{
    core::{
        tray_controller::{TrayController, TrayEvent},
        version_state::Action,
    },
    models::ShogunConfig,
};

/// Everything a handler needs.
#[derive(Debug)]
pub struct AppContext {
    pub controller: TrayController,
    pub config: ShogunConfig,
}

impl AppContext {
    pub fn new(controller: TrayController, config: ShogunConfig) -> Self {
        Self { controller, config }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.config.await_idle_timeout_secs)
    }
}

/// Waits for every pending operation. A timeout is reported and otherwise
/// ignored: the work keeps running in the background.
pub fn settle(ctx: &AppContext) -> bool {
    let settled = ctx.controller.await_idle(ctx.idle_timeout());
    if !settled {
        eprintln!(
            "{}",
            format!(
                t!("common.warning.still_running"),
                secs = ctx.config.await_idle_timeout_secs
            )
            .yellow()
        );
    }
    settled
}

/// Turns the first failure published on `events` into an error.
pub fn take_failure(events: &Receiver<TrayEvent>) -> Result<()> {
    for event in events.try_iter() {
        if let TrayEvent::OperationFailed { label, message } = event {
            return Err(anyhow!(format!(
                t!("common.error.operation_failed"),
                label = label,
                message = message
            )));
        }
    }
    Ok(())
}

/// Loads the catalog and waits for it.
pub fn load_catalog(ctx: &AppContext) -> Result<()> {
    let events = ctx.controller.subscribe();
    ctx.controller.refresh()?;
    if settle(ctx) {
        take_failure(&events)?;
    }
    Ok(())
}

/// Asks for confirmation unless `yes` was given or the config skips prompts.
pub fn confirm(ctx: &AppContext, prompt: &str, yes: bool) -> Result<bool> {
    if yes || ctx.config.skip_confirmation {
        return Ok(true);
    }
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

/// Submits one version action and waits for its outcome.
pub fn run_version_action(
    ctx: &AppContext,
    candidate: &str,
    identifier: &str,
    action: Action,
    yes: bool,
) -> Result<()> {
    // 1. Refuse illegal requests before bothering the worker.
    ctx.controller.check(candidate, identifier, action)?;

    // 2. Installs and uninstalls are confirmed.
    if matches!(action, Action::Install | Action::Uninstall) {
        let prompt = format!(
            t!("common.prompt.confirm_action"),
            action = action,
            candidate = candidate,
            version = identifier
        );
        if !confirm(ctx, &prompt, yes)? {
            println!("{}", t!("common.info.operation_cancelled"));
            return Ok(());
        }
    }

    // 3. Submit and wait.
    let events = ctx.controller.subscribe();
    ctx.controller.transition(candidate, identifier, action)?;
    println!(
        "{}",
        format!(
            t!("common.info.working"),
            action = action,
            candidate = candidate,
            version = identifier
        )
        .dimmed()
    );
    if settle(ctx) {
        take_failure(&events)?;
        println!("{}", t!("common.success").green().bold());
    }
    Ok(())
}

/// Adds `native-image` to an installed GraalVM and waits for it.
pub fn run_native_image(ctx: &AppContext, candidate: &str, identifier: &str) -> Result<()> {
    let applicable = ctx
        .controller
        .candidate(candidate)
        .and_then(|c| c.version(identifier).map(|v| v.needs_native_image()))
        .unwrap_or(false);
    if !applicable {
        return Err(anyhow!(format!(
            t!("native_image.error.not_applicable"),
            candidate = candidate,
            version = identifier
        )));
    }

    let events = ctx.controller.subscribe();
    ctx.controller.install_native_image(candidate, identifier)?;
    println!(
        "{}",
        format!(
            t!("native_image.info.installing"),
            candidate = candidate,
            version = identifier
        )
        .dimmed()
    );
    if settle(ctx) {
        take_failure(&events)?;
        println!("{}", t!("common.success").green().bold());
    }
    Ok(())
}
