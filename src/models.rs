// src/models.rs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants;

// --- CATALOG MODELS ---
// Facts reported by the external version manager. The engine only ever flips the
// status facets after the external tool has confirmed the change.

/// One installable release of a candidate, with its independent status facets.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Version {
    /// Identifier of the owning candidate (e.g. `java`).
    pub candidate: String,
    /// Version identifier understood by the version manager (e.g. `21.0.2-tem`).
    pub identifier: String,
    /// Where the version lives on disk, when it is present or detected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// A managed install is present.
    #[serde(default)]
    pub installed: bool,
    /// An unmanaged install was registered by the user.
    #[serde(default)]
    pub locally_installed: bool,
    /// Found on disk but not registered yet.
    #[serde(default)]
    pub detected: bool,
    /// This is the default version of its candidate.
    #[serde(default)]
    pub in_use: bool,
    /// A cached install artifact is kept without an active install.
    #[serde(default)]
    pub archived: bool,
    /// The GraalVM `native-image` command is present in this install.
    #[serde(default)]
    pub native_image: bool,
}

impl Version {
    /// Creates a version with every status facet cleared.
    pub fn available(candidate: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            identifier: identifier.into(),
            path: None,
            installed: false,
            locally_installed: false,
            detected: false,
            in_use: false,
            archived: false,
            native_image: false,
        }
    }

    /// Creates an unregistered version discovered at `path`.
    pub fn detected(
        candidate: impl Into<String>,
        identifier: impl Into<String>,
        path: PathBuf,
    ) -> Self {
        Self {
            path: Some(path),
            detected: true,
            ..Self::available(candidate, identifier)
        }
    }

    /// Installed or locally installed.
    pub fn is_present(&self) -> bool {
        self.installed || self.locally_installed
    }

    /// A GraalVM build of java (`-grl`, `-graal`, `-graalce` and scanned
    /// `graalvm-*` homes).
    pub fn is_graal(&self) -> bool {
        self.candidate == constants::JAVA_CANDIDATE && {
            let identifier = self.identifier.to_ascii_lowercase();
            identifier.contains("grl") || identifier.contains("graal")
        }
    }

    /// A present GraalVM install still missing its `native-image` command.
    pub fn needs_native_image(&self) -> bool {
        self.is_present() && self.is_graal() && !self.native_image
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.identifier)
    }
}

/// A named package tracked by the version manager.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    /// Versions in display order (see `core::catalog::order_for_display`).
    pub versions: Vec<Version>,
}

impl Candidate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            versions: Vec::new(),
        }
    }

    /// Membership in the "installed" view list: at least one present version.
    pub fn is_installed(&self) -> bool {
        self.versions.iter().any(Version::is_present)
    }

    pub fn in_use(&self) -> Option<&Version> {
        self.versions.iter().find(|v| v.in_use)
    }

    pub fn version(&self, identifier: &str) -> Option<&Version> {
        self.versions.iter().find(|v| v.identifier == identifier)
    }

    pub fn version_mut(&mut self, identifier: &str) -> Option<&mut Version> {
        self.versions.iter_mut().find(|v| v.identifier == identifier)
    }
}

// --- TOOL STATUS ---

/// Snapshot of the version manager itself, shown in the status section of the tray.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SdkStatus {
    pub tool_installed: bool,
    pub tool_version: Option<String>,
    pub offline: bool,
    pub update_available: bool,
    pub archives_size_bytes: u64,
}

// --- `shogun.toml` MODEL ---

/// User configuration, read from `<config_dir>/shogun/shogun.toml`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ShogunConfig {
    /// Root of the SDKMAN! installation. `~` and `$VARS` are expanded.
    pub sdkman_dir: String,
    /// Shell used to source the SDKMAN! init script.
    pub bash_path: String,
    /// Upper bound for waiting until every queued action has settled.
    pub await_idle_timeout_secs: u64,
    /// Skip the install/uninstall confirmation prompts.
    pub skip_confirmation: bool,
    /// Frame interval of the busy indicator.
    pub indicator_frame_millis: u64,
    /// Directories scanned for JDKs that SDKMAN! does not manage.
    pub jdk_scan_dirs: Vec<String>,
}

impl Default for ShogunConfig {
    fn default() -> Self {
        let jdk_scan_dirs = if cfg!(target_os = "macos") {
            vec![constants::MACOS_JVM_DIR.to_string()]
        } else {
            Vec::new()
        };
        Self {
            sdkman_dir: constants::DEFAULT_SDKMAN_DIR.to_string(),
            bash_path: default_bash_path().to_string(),
            await_idle_timeout_secs: constants::DEFAULT_AWAIT_IDLE_SECS,
            skip_confirmation: false,
            indicator_frame_millis: constants::DEFAULT_INDICATOR_FRAME_MILLIS,
            jdk_scan_dirs,
        }
    }
}

fn default_bash_path() -> &'static str {
    if cfg!(target_os = "windows") {
        "C:/Program Files/Git/bin/bash"
    } else {
        "bash"
    }
}
