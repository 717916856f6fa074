// src/core/paths.rs

use crate::{
    constants::{CONFIG_DIR_NAME, CONFIG_FILENAME, SDKMAN_DIR_ENV},
    models::ShogunConfig,
};
use anyhow::{Result, anyhow};
use lazy_static::lazy_static;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

lazy_static! {
    static ref SHOGUN_CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not create config directory at '{path}': {source}")]
    ConfigDirCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Returns the shogun configuration directory (`~/.config/shogun` on Linux).
/// Creates it if it doesn't exist.
///
/// Memoized: the first call computes and caches the path.
pub fn get_shogun_config_dir() -> Result<PathBuf, PathError> {
    let mut cached = SHOGUN_CONFIG_DIR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(path) = &*cached {
        return Ok(path.clone());
    }

    // 1. The platform config directory.
    let config_path = dirs::config_dir()
        .ok_or(PathError::ConfigDirNotFound)?
        .join(CONFIG_DIR_NAME);

    // 2. Make sure it exists.
    if !config_path.exists() {
        fs::create_dir_all(&config_path).map_err(|e| PathError::ConfigDirCreation {
            path: config_path.display().to_string(),
            source: e,
        })?;
    }

    // 3. Cache it.
    *cached = Some(config_path.clone());
    Ok(config_path)
}

/// Returns the path of `shogun.toml`.
pub fn get_config_path() -> Result<PathBuf, PathError> {
    get_shogun_config_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// Expands `~` and environment variables (`$VAR`, `${VAR}`) in a configured path.
pub fn expand_path(template: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(template)
        .map_err(|e| anyhow!("Failed to expand path '{}': {}", template, e))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

/// The SDKMAN! root: `$SDKMAN_DIR` when set, otherwise `sdkman_dir` from the config.
pub fn resolve_sdkman_dir(config: &ShogunConfig) -> Result<PathBuf> {
    match std::env::var(SDKMAN_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => expand_path(dir.trim()),
        _ => expand_path(&config.sdkman_dir),
    }
}

/// Every configured JDK scan root, expanded. Roots that fail to expand are skipped.
pub fn jdk_scan_roots(config: &ShogunConfig) -> Vec<PathBuf> {
    config
        .jdk_scan_dirs
        .iter()
        .filter_map(|dir| match expand_path(dir) {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        })
        .collect()
}
