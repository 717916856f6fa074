// src/core/catalog.rs

//! # Candidate Catalog
//!
//! In-memory mirror of what the version manager reports: every known candidate
//! keyed by identifier, plus the tool's own status. Discovery talks to the
//! version manager without touching the catalog; the resulting snapshot is
//! applied in one step, so a failed refresh leaves the catalog as it was.

use crate::{
    constants::JAVA_CANDIDATE,
    models::{Candidate, SdkStatus, Version},
    system::{jdk_scanner, version_manager::VersionManager},
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct CandidateCatalog {
    candidates: HashMap<String, Candidate>,
    /// Version identifiers per candidate in the tool's order, as last listed.
    native_order: HashMap<String, Vec<String>>,
    status: SdkStatus,
}

/// Everything a refresh learned, computed without holding the catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub status: SdkStatus,
    /// Candidates with a local install, in the tool's order.
    pub installed: Vec<String>,
    /// Remaining candidates offered by the tool. Empty while offline.
    pub available: Vec<String>,
    /// Versions per candidate, already in display order.
    pub versions: Vec<(String, Vec<Version>)>,
}

impl CatalogSnapshot {
    /// Every discovered candidate, installed ones first.
    pub fn candidate_ids(&self) -> impl Iterator<Item = &str> {
        self.installed
            .iter()
            .chain(self.available.iter())
            .map(String::as_str)
    }
}

impl CandidateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Candidate> {
        self.candidates.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Candidate> {
        self.candidates.get_mut(id)
    }

    /// Returns the candidate, creating an empty one on first discovery.
    /// Candidates are never removed.
    pub fn ensure(&mut self, id: &str) -> &mut Candidate {
        self.candidates
            .entry(id.to_string())
            .or_insert_with(|| Candidate::new(id))
    }

    /// Identifiers of every known candidate, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.candidates.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.values()
    }

    pub fn status(&self) -> &SdkStatus {
        &self.status
    }

    pub fn set_status(&mut self, status: SdkStatus) {
        self.status = status;
    }

    /// Replaces a candidate's versions with a freshly listed set.
    pub fn replace_versions(&mut self, id: &str, versions: Vec<Version>) {
        let native = versions.iter().map(|v| v.identifier.clone()).collect();
        self.native_order.insert(id.to_string(), native);
        self.ensure(id).versions = order_for_display(versions);
    }

    /// Re-sorts a candidate after its facets changed in memory, giving the
    /// same order a refresh would.
    pub fn reorder(&mut self, id: &str) {
        let Some(candidate) = self.candidates.get_mut(id) else {
            return;
        };
        if let Some(native) = self.native_order.get(id) {
            // Versions the tool never listed keep their place after the rest.
            candidate.versions.sort_by_key(|v| {
                native
                    .iter()
                    .position(|n| *n == v.identifier)
                    .unwrap_or(native.len())
            });
        }
        candidate.versions = order_for_display(std::mem::take(&mut candidate.versions));
    }

    /// Applies a refresh result and returns the identifiers it touched.
    pub fn apply_snapshot(&mut self, snapshot: CatalogSnapshot) -> Vec<String> {
        self.status = snapshot.status;
        for id in snapshot.installed.iter().chain(snapshot.available.iter()) {
            self.ensure(id);
        }
        let mut touched = Vec::with_capacity(snapshot.versions.len());
        for (id, versions) in snapshot.versions {
            self.replace_versions(&id, versions);
            touched.push(id);
        }
        touched
    }
}

// --- Ordering ---

/// Present versions first, then detected ones, then the rest. Each group keeps
/// the tool's native order, so repeated refreshes do not reshuffle entries.
pub fn order_for_display(versions: Vec<Version>) -> Vec<Version> {
    let (present, rest): (Vec<_>, Vec<_>) = versions.into_iter().partition(Version::is_present);
    let (detected, rest): (Vec<_>, Vec<_>) = rest.into_iter().partition(|v| v.detected);
    present.into_iter().chain(detected).chain(rest).collect()
}

/// Adds scanned JDKs to the `java` versions. A scanned JDK that the tool
/// already lists (same identifier or same path) only marks that entry detected
/// when it is not present yet.
pub fn merge_detected(versions: &mut Vec<Version>, detected: Vec<Version>) {
    for found in detected {
        let existing = versions.iter_mut().find(|v| {
            v.identifier == found.identifier
                || (v.path.is_some() && v.path == found.path)
        });
        match existing {
            Some(version) if version.is_present() => {}
            Some(version) => {
                version.detected = true;
                version.path = found.path;
            }
            None => versions.push(found),
        }
    }
}

// --- Discovery ---

/// Reads the tool's own status.
pub fn read_status(manager: &dyn VersionManager) -> SdkStatus {
    let tool_installed = manager.is_installed();
    if !tool_installed {
        return SdkStatus::default();
    }
    let tool_version = match manager.version() {
        Ok(version) => Some(version),
        Err(e) => {
            log::warn!("Could not read the version manager's version: {}", e);
            None
        }
    };
    let offline = manager.is_offline();
    SdkStatus {
        tool_installed,
        tool_version,
        offline,
        update_available: !offline && manager.is_update_available(),
        archives_size_bytes: manager.archives_size(),
    }
}

/// Queries the version manager for everything a refresh needs. Version lists
/// are fetched in parallel; any failing call fails the whole discovery.
pub fn discover(manager: &dyn VersionManager, jdk_roots: &[PathBuf]) -> Result<CatalogSnapshot> {
    let status = read_status(manager);
    if !status.tool_installed {
        log::debug!("Version manager not installed, nothing to discover.");
        return Ok(CatalogSnapshot {
            status,
            ..CatalogSnapshot::default()
        });
    }

    // 1. Installed candidates work offline.
    let installed = manager
        .installed_candidates()
        .context("Failed to read the installed candidates")?;
    log::debug!("Installed candidates: {:?}", installed);

    // 2. The full catalog needs the network.
    let mut available = if status.offline {
        log::debug!("Offline, skipping the available candidates.");
        Vec::new()
    } else {
        let installed_set: HashSet<&str> = installed.iter().map(String::as_str).collect();
        manager
            .list_candidates()
            .context("Failed to list the available candidates")?
            .into_iter()
            .filter(|id| !installed_set.contains(id.as_str()))
            .collect()
    };
    log::debug!("{} candidates available to install.", available.len());

    // 3. Versions of every candidate.
    let ids: Vec<&String> = installed.iter().chain(available.iter()).collect();
    let mut versions = ids
        .par_iter()
        .map(|id| {
            manager
                .list(id)
                .map(|list| ((*id).clone(), list))
                .with_context(|| format!("Failed to list the versions of '{}'", id))
        })
        .collect::<Result<Vec<_>>>()?;

    // 4. Unmanaged JDKs.
    if !jdk_roots.is_empty() {
        let scanned = jdk_scanner::scan(jdk_roots);
        if !scanned.is_empty() {
            match versions.iter_mut().find(|(id, _)| id == JAVA_CANDIDATE) {
                Some((_, java)) => merge_detected(java, scanned),
                None => {
                    // Only unmanaged JDKs: java is still offered, as not installed.
                    available.push(JAVA_CANDIDATE.to_string());
                    versions.push((JAVA_CANDIDATE.to_string(), scanned));
                }
            }
        }
    }

    let versions = versions
        .into_iter()
        .map(|(id, list)| (id, order_for_display(list)))
        .collect();

    Ok(CatalogSnapshot {
        status,
        installed,
        available,
        versions,
    })
}

/// Lists one candidate again, with scanned JDKs merged into `java`, in
/// display order.
pub fn relist(manager: &dyn VersionManager, id: &str, jdk_roots: &[PathBuf]) -> Result<Vec<Version>> {
    let mut versions = manager
        .list(id)
        .with_context(|| format!("Failed to list the versions of '{}'", id))?;
    if id == JAVA_CANDIDATE && !jdk_roots.is_empty() {
        merge_detected(&mut versions, jdk_scanner::scan(jdk_roots));
    }
    Ok(order_for_display(versions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::version_manager::fake::FakeVersionManager;
    use std::path::PathBuf;

    fn version(id: &str, setup: impl FnOnce(&mut Version)) -> Version {
        let mut version = Version::available("java", id);
        setup(&mut version);
        version
    }

    fn ids(versions: &[Version]) -> Vec<&str> {
        versions.iter().map(|v| v.identifier.as_str()).collect()
    }

    #[test]
    fn test_display_order_groups_are_stable() {
        let versions = vec![
            version("21", |_| {}),
            version("17", |v| v.installed = true),
            version("local", |v| v.detected = true),
            version("11", |_| {}),
            version("8", |v| v.locally_installed = true),
        ];
        let ordered = order_for_display(versions);
        assert_eq!(ids(&ordered), vec!["17", "8", "local", "21", "11"]);
        assert_eq!(ids(&order_for_display(ordered.clone())), ids(&ordered));
    }

    #[test]
    fn test_merge_detected_skips_present_and_flags_known() {
        let mut versions = vec![
            version("21.0.2-tem", |v| v.installed = true),
            version("17.0.10-tem", |_| {}),
        ];
        let scanned = vec![
            Version::detected("java", "21.0.2-tem", PathBuf::from("/jvm/a")),
            Version::detected("java", "17.0.10-tem", PathBuf::from("/jvm/b")),
            Version::detected("java", "zulu-11", PathBuf::from("/jvm/c")),
        ];
        merge_detected(&mut versions, scanned);

        assert_eq!(ids(&versions), vec!["21.0.2-tem", "17.0.10-tem", "zulu-11"]);
        assert!(!versions[0].detected, "present versions are left alone");
        assert!(versions[1].detected);
        assert_eq!(versions[1].path.as_deref(), Some(PathBuf::from("/jvm/b").as_path()));
        assert!(versions[2].detected);
    }

    #[test]
    fn test_discover_splits_installed_and_available() {
        let mut gradle = Version::available("gradle", "8.5");
        gradle.installed = true;
        let manager = FakeVersionManager::new()
            .with_candidate("ant", &["1.10"])
            .with_candidate("gradle", &["8.6"])
            .with_version(gradle)
            .with_candidate("java", &["21.0.2-tem"]);

        let snapshot = discover(&manager, &[]).unwrap();
        assert_eq!(snapshot.installed, vec!["gradle"]);
        assert_eq!(snapshot.available, vec!["ant", "java"]);
        assert_eq!(snapshot.candidate_ids().count(), 3);
        assert_eq!(snapshot.status.tool_version.as_deref(), Some("5.18.2"));

        let (_, gradle_versions) = snapshot
            .versions
            .iter()
            .find(|(id, _)| id == "gradle")
            .unwrap();
        assert_eq!(ids(gradle_versions), vec!["8.5", "8.6"]);
    }

    #[test]
    fn test_offline_discovery_only_reports_installed() {
        let mut maven = Version::available("maven", "3.9.6");
        maven.installed = true;
        let manager = FakeVersionManager::new()
            .with_candidate("ant", &["1.10"])
            .with_version(maven)
            .offline();

        let snapshot = discover(&manager, &[]).unwrap();
        assert_eq!(snapshot.installed, vec!["maven"]);
        assert!(snapshot.available.is_empty());
        assert!(snapshot.status.offline);
        assert!(!snapshot.status.update_available);
    }

    #[test]
    fn test_reorder_restores_native_order_within_groups() {
        let mut catalog = CandidateCatalog::new();
        catalog.replace_versions(
            "java",
            vec![version("21", |_| {}), version("17", |_| {}), version("11", |_| {})],
        );

        catalog.get_mut("java").unwrap().version_mut("11").unwrap().installed = true;
        catalog.reorder("java");
        assert_eq!(ids(&catalog.get("java").unwrap().versions), vec!["11", "21", "17"]);

        catalog.get_mut("java").unwrap().version_mut("11").unwrap().installed = false;
        catalog.reorder("java");
        assert_eq!(ids(&catalog.get("java").unwrap().versions), vec!["21", "17", "11"]);
    }

    #[test]
    fn test_relist_orders_for_display() {
        let mut installed = Version::available("java", "17.0.10-tem");
        installed.installed = true;
        let manager = FakeVersionManager::new()
            .with_candidate("java", &["21.0.2-tem"])
            .with_version(installed);

        let versions = relist(&manager, "java", &[]).unwrap();
        assert_eq!(ids(&versions), vec!["17.0.10-tem", "21.0.2-tem"]);
        assert!(relist(&manager, "kotlin", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_apply_snapshot_keeps_existing_candidates() {
        let mut catalog = CandidateCatalog::new();
        catalog.ensure("scala");
        let snapshot = CatalogSnapshot {
            installed: vec!["java".into()],
            available: vec!["ant".into()],
            versions: vec![("java".into(), vec![version("21", |v| v.installed = true)])],
            ..CatalogSnapshot::default()
        };

        let touched = catalog.apply_snapshot(snapshot);
        assert_eq!(touched, vec!["java"]);
        assert_eq!(catalog.ids(), vec!["ant", "java", "scala"]);
        assert!(catalog.get("java").unwrap().is_installed());
        assert!(catalog.get("ant").unwrap().versions.is_empty());
    }
}
