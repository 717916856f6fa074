// src/system/executor.rs

use dunce;
use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

lazy_static! {
    // SGR sequences the version manager uses to colour its output.
    static ref ANSI_ESCAPE_RE: Regex = Regex::new(r"\x1b\[[0-9;]*m").unwrap();
}

/// Answer fed to interactive prompts (e.g. "set as default?"). Defaults are
/// always an explicit, separate action in the tray.
const PROMPT_ANSWER: &[u8] = b"n\n";

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Argument could not be quoted for the shell: {0}")]
    CommandParse(String),
    #[error("No command specified to run.")]
    EmptyCommand,
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    #[error("Command '{command}' exited with a non-zero status: {output}")]
    NonZeroExitStatus { command: String, output: String },
}

/// Captured result of a finished command, with ANSI codes removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub output: String,
}

/// Runs `script` with `bash -c`, answering "no" to any prompt, and returns its
/// combined stdout and stderr. A non-zero exit status is reported in
/// `CommandOutput::success`, not as an error.
pub fn run_bash(
    bash: &str,
    script: &str,
    cwd: &Path,
    env_vars: &HashMap<String, String>,
) -> Result<CommandOutput, ExecutionError> {
    let trimmed = script.trim();
    if trimmed.is_empty() {
        return Err(ExecutionError::EmptyCommand);
    }
    log::debug!("Command to be executed: {}", trimmed);

    let mut child = StdCommand::new(bash)
        .arg("-c")
        .arg(trimmed)
        .current_dir(dunce::simplified(cwd))
        .envs(env_vars)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ExecutionError::CommandFailed(trimmed.to_string(), e))?;

    if let Some(mut stdin) = child.stdin.take() {
        // The command may exit without reading; a broken pipe is fine.
        if let Err(e) = stdin.write_all(PROMPT_ANSWER) {
            log::trace!("Could not answer prompt of '{}': {}", trimmed, e);
        }
    }

    let finished = child
        .wait_with_output()
        .map_err(|e| ExecutionError::CommandFailed(trimmed.to_string(), e))?;

    let mut combined = String::from_utf8_lossy(&finished.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&finished.stderr));
    let output = strip_ansi(&combined).into_owned();
    log::trace!("Response: {}", output);

    Ok(CommandOutput {
        success: finished.status.success(),
        output,
    })
}

/// Like [`run_bash`], but a non-zero exit status becomes an error.
pub fn run_bash_checked(
    bash: &str,
    script: &str,
    cwd: &Path,
    env_vars: &HashMap<String, String>,
) -> Result<String, ExecutionError> {
    let result = run_bash(bash, script, cwd, env_vars)?;
    if result.success {
        Ok(result.output)
    } else {
        Err(ExecutionError::NonZeroExitStatus {
            command: script.trim().to_string(),
            output: result.output.trim().to_string(),
        })
    }
}

/// Quotes `arg` for safe interpolation into a bash script.
pub fn quote(arg: &str) -> Result<Cow<'_, str>, ExecutionError> {
    shlex::try_quote(arg).map_err(|_| ExecutionError::CommandParse(arg.to_string()))
}

/// Removes colour escape sequences from tool output.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_ESCAPE_RE.replace_all(text, "")
}
