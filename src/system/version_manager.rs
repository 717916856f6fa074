// src/system/version_manager.rs

//! The boundary to the external version manager. Everything the engine knows
//! about candidates and versions comes through this trait; every call may block
//! on a subprocess or the network, so the engine only calls it from the
//! background action worker.

use crate::{models::Version, system::executor::ExecutionError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VersionManagerError {
    #[error("'{command}' failed: {output}")]
    ExternalToolFailure { command: String, output: String },
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("The version manager is not installed.")]
    NotInstalled,
    #[error("{candidate} {version} has no install directory.")]
    NoInstallPath { candidate: String, version: String },
}

pub type ManagerResult<T> = Result<T, VersionManagerError>;

/// Operations the tray needs from a version manager such as SDKMAN!.
pub trait VersionManager: Send + Sync {
    /// Whether the tool itself is installed.
    fn is_installed(&self) -> bool;

    /// Whether the tool is configured to work without network access.
    fn is_offline(&self) -> bool;

    /// The tool's own version string.
    fn version(&self) -> ManagerResult<String>;

    fn is_update_available(&self) -> bool;

    /// Identifiers of every candidate the tool offers. Needs the network.
    fn list_candidates(&self) -> ManagerResult<Vec<String>>;

    /// Identifiers of candidates with at least one local install. Works offline.
    fn installed_candidates(&self) -> ManagerResult<Vec<String>>;

    /// Versions of a candidate in the tool's native order, with status facets.
    fn list(&self, candidate: &str) -> ManagerResult<Vec<Version>>;

    /// Installs a version; for a detected version this registers its path.
    fn install(&self, version: &Version) -> ManagerResult<()>;

    /// Uninstalls a managed version or unregisters a local one.
    fn uninstall(&self, version: &Version) -> ManagerResult<()>;

    fn make_default(&self, candidate: &str, version: &Version) -> ManagerResult<()>;

    /// Deletes the cached artifact of a version that is not installed.
    fn remove_archive(&self, version: &Version) -> ManagerResult<()>;

    /// Whether a cached artifact of this version is kept.
    fn has_archive(&self, version: &Version) -> bool;

    /// Total size of the cached artifacts, in bytes.
    fn archives_size(&self) -> u64;

    /// Deletes every cached artifact.
    fn flush_archives(&self) -> ManagerResult<()>;

    /// Installs the tool itself.
    fn install_tool(&self) -> ManagerResult<()>;

    /// Updates the tool itself.
    fn update_tool(&self) -> ManagerResult<()>;

    /// Adds the `native-image` command to an installed GraalVM.
    fn install_native_image(&self, version: &Version) -> ManagerResult<()>;
}
