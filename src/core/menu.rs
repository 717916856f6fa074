// src/core/menu.rs

//! Pure rendering model of the tray menu. Built from the catalog and the view
//! lists; nothing here mutates state, so the front end can rebuild it on every
//! repaint.

use crate::{
    core::{
        catalog::CandidateCatalog,
        version_state::{self, Action},
        view_lists::ViewLists,
    },
    models::{Candidate, SdkStatus, Version},
};
use serde::Serialize;

/// A clickable entry below a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MenuAction {
    MakeDefault,
    Install,
    /// Install of a detected version: registers the existing directory.
    Register,
    Uninstall,
    /// Uninstall of a locally installed version: only drops the registration.
    Unregister,
    RemoveArchive,
    /// Adds the `native-image` command to an installed GraalVM.
    InstallNativeImage,
}

impl MenuAction {
    /// The state machine action this entry triggers, if it is a transition.
    pub fn action(self) -> Option<Action> {
        match self {
            Self::MakeDefault => Some(Action::SetDefault),
            Self::Install | Self::Register => Some(Action::Install),
            Self::Uninstall | Self::Unregister => Some(Action::Uninstall),
            Self::RemoveArchive => Some(Action::RemoveArchive),
            Self::InstallNativeImage => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::MakeDefault => t!("menu.action.make_default"),
            Self::Install => t!("menu.action.install"),
            Self::Register => t!("menu.action.register"),
            Self::Uninstall => t!("menu.action.uninstall"),
            Self::Unregister => t!("menu.action.unregister"),
            Self::RemoveArchive => t!("menu.action.remove_archive"),
            Self::InstallNativeImage => t!("menu.action.install_native_image"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionEntry {
    pub identifier: String,
    pub label: String,
    pub actions: Vec<MenuAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateMenu {
    pub id: String,
    pub label: String,
    pub versions: Vec<VersionEntry>,
}

/// The whole menu: status section, then installed candidates, then the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrayMenu {
    pub status: String,
    pub update_available: bool,
    /// Present when there are cached archives to flush.
    pub archives: Option<String>,
    pub installed: Vec<CandidateMenu>,
    pub available: Vec<CandidateMenu>,
}

// --- Labels ---

/// `>` marks the default version; the suffix names its presence.
pub fn version_label(version: &Version) -> String {
    let marker = if version.in_use { ">" } else { "  " };
    let suffix = if version.locally_installed {
        " (local only)"
    } else if version.installed {
        " (installed)"
    } else if version.detected {
        " (detected)"
    } else {
        ""
    };
    format!("{}{}{}", marker, version.identifier, suffix)
}

/// `<candidate> > <version in use>`, or just the identifier without a default.
pub fn candidate_label(candidate: &Candidate) -> String {
    match candidate.in_use() {
        Some(version) => format!("{} > {}", candidate.id, version.identifier),
        None => candidate.id.clone(),
    }
}

/// Affordances of one version, in menu order.
pub fn version_actions(version: &Version) -> Vec<MenuAction> {
    let mut actions: Vec<MenuAction> = version_state::permitted_actions(version)
        .into_iter()
        .map(|action| match action {
            Action::SetDefault => MenuAction::MakeDefault,
            Action::Install if version.detected => MenuAction::Register,
            Action::Install => MenuAction::Install,
            Action::Uninstall if version.locally_installed => MenuAction::Unregister,
            Action::Uninstall => MenuAction::Uninstall,
            Action::RemoveArchive => MenuAction::RemoveArchive,
        })
        .collect();
    if version.needs_native_image() {
        // Right after "make default", before uninstall.
        let at = usize::from(actions.first() == Some(&MenuAction::MakeDefault));
        actions.insert(at, MenuAction::InstallNativeImage);
    }
    actions
}

/// Human readable byte count (`1.5 MB`).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = "KB";
    for next in UNITS.iter().skip(1) {
        if size < 1024.0 {
            break;
        }
        size /= 1024.0;
        unit = next;
    }
    format!("{:.1} {}", size, unit)
}

pub fn status_line(status: &SdkStatus) -> String {
    if !status.tool_installed {
        return t!("menu.status.not_installed").to_string();
    }
    let version = status.tool_version.as_deref().unwrap_or("?");
    if status.offline {
        format!(t!("menu.status.offline"), version = version)
    } else {
        format!(t!("menu.status.online"), version = version)
    }
}

// --- Building ---

fn candidate_menu(catalog: &CandidateCatalog, id: &str) -> CandidateMenu {
    match catalog.get(id) {
        Some(candidate) => CandidateMenu {
            id: id.to_string(),
            label: candidate_label(candidate),
            versions: candidate
                .versions
                .iter()
                .map(|version| VersionEntry {
                    identifier: version.identifier.clone(),
                    label: version_label(version),
                    actions: version_actions(version),
                })
                .collect(),
        },
        None => CandidateMenu {
            id: id.to_string(),
            label: id.to_string(),
            versions: Vec::new(),
        },
    }
}

/// Builds the menu in view list order.
pub fn build(catalog: &CandidateCatalog, lists: &ViewLists) -> TrayMenu {
    let status = catalog.status();
    let archives = (status.archives_size_bytes > 0).then(|| {
        format!(
            t!("menu.archives.flush"),
            size = format_size(status.archives_size_bytes)
        )
    });
    TrayMenu {
        status: status_line(status),
        update_available: status.update_available,
        archives,
        installed: lists
            .installed()
            .iter()
            .map(|id| candidate_menu(catalog, id))
            .collect(),
        available: lists
            .available()
            .iter()
            .map(|id| candidate_menu(catalog, id))
            .collect(),
    }
}
