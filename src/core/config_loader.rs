// src/core/config_loader.rs

use crate::{core::paths, models::ShogunConfig};
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Path(#[from] paths::PathError),
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration in '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Could not serialize the default configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Loads `shogun.toml` from the config directory, writing the defaults first
/// when the file does not exist yet.
pub fn load_config() -> Result<ShogunConfig, ConfigError> {
    let path = paths::get_config_path()?;
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<ShogunConfig, ConfigError> {
    if !path.exists() {
        log::debug!("No configuration at '{}', writing defaults.", path.display());
        let default_config = ShogunConfig::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(&default_config)?)?;
        return Ok(default_config);
    }

    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}
