// src/core/tray_controller.rs

//! # Tray Controller
//!
//! Wires user actions to the two serializers. Every action follows the same
//! path:
//!
//! 1. On the action worker, validate the request against the catalog.
//! 2. Delegate to the version manager with no lock held.
//! 3. Apply the transition to the catalog once the tool reported success.
//! 4. Ask the UI worker to reconcile the view lists and announce the change.
//!
//! Catalog and view lists sit behind mutexes so the front end can read them,
//! but they are only ever written from inside the serializers. Lock order is
//! catalog, then lists.

use crate::{
    constants::{ACTION_QUEUE_NAME, UI_QUEUE_NAME},
    core::{
        busy::BusyGate,
        catalog::{self, CandidateCatalog},
        menu::{self, TrayMenu},
        paths,
        serializer::{Operation, Serializer, SerializerError},
        version_state::{self, Action, TransitionError},
        view_lists::ViewLists,
    },
    models::{Candidate, SdkStatus, ShogunConfig, Version},
    system::version_manager::VersionManager,
};
use anyhow::{Context, Result, bail};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Notifications for the front end. Sent from the worker threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayEvent {
    /// The view lists changed; carries the new state.
    ListsChanged(ViewLists),
    /// Versions or labels of one candidate changed.
    CandidateChanged(String),
    StatusChanged(SdkStatus),
    /// An operation failed. Its effects were not applied.
    OperationFailed { label: String, message: String },
}

struct Inner {
    gate: Arc<BusyGate>,
    action: Serializer,
    ui: Serializer,
    manager: Arc<dyn VersionManager>,
    catalog: Mutex<CandidateCatalog>,
    lists: Mutex<ViewLists>,
    subscribers: Mutex<Vec<Sender<TrayEvent>>>,
    jdk_roots: Vec<PathBuf>,
}

/// Handle to the engine. Cheap to clone; every clone drives the same workers.
#[derive(Clone)]
pub struct TrayController {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TrayController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrayController")
            .field("action", &self.inner.action.name())
            .field("ui", &self.inner.ui.name())
            .field("in_flight", &self.inner.gate.in_flight())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Writers only run inside serialized operations, and a panicking operation
    // never leaves a half-applied transition behind.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TrayController {
    /// Starts both workers. Nothing is loaded until [`TrayController::refresh`].
    pub fn new(manager: Arc<dyn VersionManager>, config: &ShogunConfig) -> Result<Self, SerializerError> {
        let gate = Arc::new(BusyGate::new());
        let action = Serializer::spawn(ACTION_QUEUE_NAME, Arc::clone(&gate))?;
        let ui = Serializer::spawn(UI_QUEUE_NAME, Arc::clone(&gate))?;
        Ok(Self {
            inner: Arc::new(Inner {
                gate,
                action,
                ui,
                manager,
                catalog: Mutex::new(CandidateCatalog::new()),
                lists: Mutex::new(ViewLists::new()),
                subscribers: Mutex::new(Vec::new()),
                jdk_roots: paths::jdk_scan_roots(config),
            }),
        })
    }

    // --- Upward interface ---

    /// Runs `operation` on the background action worker.
    pub fn submit_action<F>(&self, label: impl Into<String>, operation: F) -> Result<(), SerializerError>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.inner.submit_action(label.into(), operation)
    }

    /// Runs `operation` on the UI-affine worker.
    pub fn run_on_ui_thread<F>(&self, label: impl Into<String>, operation: F) -> Result<(), SerializerError>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.inner.run_on_ui_thread(label.into(), operation)
    }

    /// Waits until both queues are empty. `false` means the timeout elapsed
    /// first; the pending operations keep running.
    pub fn await_idle(&self, timeout: Duration) -> bool {
        self.inner.gate.await_idle(timeout)
    }

    pub fn gate(&self) -> Arc<BusyGate> {
        Arc::clone(&self.inner.gate)
    }

    /// Receives every event published from now on.
    pub fn subscribe(&self) -> Receiver<TrayEvent> {
        let (sender, receiver) = unbounded();
        lock(&self.inner.subscribers).push(sender);
        receiver
    }

    pub fn view_lists(&self) -> ViewLists {
        lock(&self.inner.lists).clone()
    }

    pub fn candidate(&self, id: &str) -> Option<Candidate> {
        lock(&self.inner.catalog).get(id).cloned()
    }

    pub fn status(&self) -> SdkStatus {
        lock(&self.inner.catalog).status().clone()
    }

    /// The rendering model for the current state.
    pub fn menu(&self) -> TrayMenu {
        let catalog = lock(&self.inner.catalog);
        let lists = lock(&self.inner.lists);
        menu::build(&catalog, &lists)
    }

    /// Checks a request against the current catalog without submitting it,
    /// so a front end can refuse it up front. The operation checks again.
    pub fn check(&self, candidate: &str, identifier: &str, action: Action) -> Result<(), TransitionError> {
        let catalog = lock(&self.inner.catalog);
        let found = catalog
            .get(candidate)
            .ok_or_else(|| TransitionError::UnknownCandidate(candidate.to_string()))?;
        version_state::validate(found, identifier, action).map(|_| ())
    }

    // --- Catalog operations ---

    /// Reloads tool status, candidates and versions from the version manager.
    pub fn refresh(&self) -> Result<(), SerializerError> {
        self.inner.submit_refresh()
    }

    pub fn install(&self, candidate: &str, identifier: &str) -> Result<(), SerializerError> {
        self.transition(candidate, identifier, Action::Install)
    }

    pub fn uninstall(&self, candidate: &str, identifier: &str) -> Result<(), SerializerError> {
        self.transition(candidate, identifier, Action::Uninstall)
    }

    pub fn set_default(&self, candidate: &str, identifier: &str) -> Result<(), SerializerError> {
        self.transition(candidate, identifier, Action::SetDefault)
    }

    pub fn remove_archive(&self, candidate: &str, identifier: &str) -> Result<(), SerializerError> {
        self.transition(candidate, identifier, Action::RemoveArchive)
    }

    pub fn transition(&self, candidate: &str, identifier: &str, action: Action) -> Result<(), SerializerError> {
        let inner = Arc::clone(&self.inner);
        let candidate = candidate.to_string();
        let identifier = identifier.to_string();
        let label = format!("{} {} {}", action, candidate, identifier);
        self.inner.submit_action(label, move || {
            inner.run_transition(&candidate, &identifier, action)
        })
    }

    /// Adds the `native-image` command to an installed GraalVM, then lists
    /// the candidate again.
    pub fn install_native_image(&self, candidate: &str, identifier: &str) -> Result<(), SerializerError> {
        let inner = Arc::clone(&self.inner);
        let candidate = candidate.to_string();
        let identifier = identifier.to_string();
        let label = format!("install native-image {} {}", candidate, identifier);
        self.inner.submit_action(label, move || {
            inner.run_install_native_image(&candidate, &identifier)
        })
    }

    /// Deletes every cached archive.
    pub fn flush_archives(&self) -> Result<(), SerializerError> {
        let inner = Arc::clone(&self.inner);
        self.inner
            .submit_action("flush archives".to_string(), move || inner.run_flush_archives())
    }

    /// Installs the version manager itself, then reloads everything.
    pub fn install_tool(&self) -> Result<(), SerializerError> {
        let inner = Arc::clone(&self.inner);
        self.inner.submit_action("install tool".to_string(), move || {
            inner.manager.install_tool().context("Failed to install the version manager")?;
            // Runs inline: we are on the action worker.
            inner.submit_refresh()?;
            Ok(())
        })
    }

    /// Self-updates the version manager, then reloads everything.
    pub fn update_tool(&self) -> Result<(), SerializerError> {
        let inner = Arc::clone(&self.inner);
        self.inner.submit_action("update tool".to_string(), move || {
            inner.manager.update_tool().context("Failed to update the version manager")?;
            inner.submit_refresh()?;
            Ok(())
        })
    }
}

impl Inner {
    fn publish(&self, event: TrayEvent) {
        let mut subscribers = lock(&self.subscribers);
        subscribers.retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    /// Wraps `operation` so a failure is also announced to subscribers.
    fn announced<F>(self: &Arc<Self>, label: &str, operation: F) -> Operation
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let inner = Arc::clone(self);
        let label = label.to_string();
        Box::new(move || {
            let result = operation();
            if let Err(e) = &result {
                inner.publish(TrayEvent::OperationFailed {
                    label,
                    message: format!("{:#}", e),
                });
            }
            result
        })
    }

    fn submit_action<F>(self: &Arc<Self>, label: String, operation: F) -> Result<(), SerializerError>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let wrapped = self.announced(&label, operation);
        self.action.submit(label, wrapped)
    }

    fn run_on_ui_thread<F>(self: &Arc<Self>, label: String, operation: F) -> Result<(), SerializerError>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let wrapped = self.announced(&label, operation);
        self.ui.submit(label, wrapped)
    }

    fn submit_refresh(self: &Arc<Self>) -> Result<(), SerializerError> {
        let inner = Arc::clone(self);
        self.submit_action("refresh".to_string(), move || inner.run_refresh())
    }

    /// Puts each candidate in the view list matching its current membership.
    fn submit_reconcile(self: &Arc<Self>, candidates: Vec<String>) -> Result<(), SerializerError> {
        let inner = Arc::clone(self);
        let label = match candidates.as_slice() {
            [single] => format!("reconcile {}", single),
            many => format!("reconcile {} candidates", many.len()),
        };
        self.run_on_ui_thread(label, move || inner.run_reconcile(&candidates))
    }

    // --- Operation bodies ---

    fn run_refresh(self: &Arc<Self>) -> Result<()> {
        // Discovery talks to the tool; the catalog stays untouched until it succeeds.
        let snapshot = catalog::discover(self.manager.as_ref(), &self.jdk_roots)
            .context("Failed to refresh the catalog")?;
        let ids: Vec<String> = snapshot.candidate_ids().map(str::to_string).collect();

        let (status, touched) = {
            let mut catalog = lock(&self.catalog);
            let touched = catalog.apply_snapshot(snapshot);
            (catalog.status().clone(), touched)
        };
        log::debug!("Refreshed {} candidates.", ids.len());

        self.publish(TrayEvent::StatusChanged(status));
        for id in touched {
            self.publish(TrayEvent::CandidateChanged(id));
        }
        self.submit_reconcile(ids)?;
        Ok(())
    }

    fn run_transition(self: &Arc<Self>, candidate: &str, identifier: &str, action: Action) -> Result<()> {
        // 1. Validate and take a copy of the version to hand to the tool.
        let version: Version = {
            let catalog = lock(&self.catalog);
            let found = catalog
                .get(candidate)
                .ok_or_else(|| TransitionError::UnknownCandidate(candidate.to_string()))?;
            version_state::validate(found, identifier, action)?;
            found
                .version(identifier)
                .cloned()
                .ok_or_else(|| TransitionError::UnknownVersion {
                    candidate: candidate.to_string(),
                    version: identifier.to_string(),
                })?
        };

        // 2. The external call. On failure nothing below runs.
        let delegated = match action {
            Action::Install => self.manager.install(&version),
            Action::Uninstall => self.manager.uninstall(&version),
            Action::SetDefault => self.manager.make_default(candidate, &version),
            Action::RemoveArchive => self.manager.remove_archive(&version),
        };
        delegated.with_context(|| format!("Failed to {} {} {}", action, candidate, identifier))?;
        // A managed uninstall leaves the downloaded archive behind.
        let keeps_archive = action == Action::Uninstall && self.manager.has_archive(&version);

        // 3. Publish both sides of the change at once.
        let outcome = {
            let mut catalog = lock(&self.catalog);
            let found = catalog
                .get_mut(candidate)
                .ok_or_else(|| TransitionError::UnknownCandidate(candidate.to_string()))?;
            let outcome = version_state::apply(found, identifier, action)?;
            if action == Action::Uninstall {
                if let Some(changed) = found.version_mut(identifier) {
                    changed.archived = keeps_archive;
                }
            }
            // Same order a refresh would produce, so the next one moves nothing.
            catalog.reorder(candidate);
            outcome
        };
        if let Some(previous) = &outcome.previous_default {
            log::debug!("{} default moved from {} to {}", candidate, previous, identifier);
        }
        self.publish(TrayEvent::CandidateChanged(candidate.to_string()));

        if matches!(action, Action::Install | Action::Uninstall | Action::RemoveArchive) {
            self.refresh_archives_size();
        }

        // 4. Membership may have flipped.
        if action != Action::SetDefault {
            self.submit_reconcile(vec![candidate.to_string()])?;
        }
        Ok(())
    }

    fn run_install_native_image(self: &Arc<Self>, candidate: &str, identifier: &str) -> Result<()> {
        let version = {
            let catalog = lock(&self.catalog);
            let found = catalog
                .get(candidate)
                .ok_or_else(|| TransitionError::UnknownCandidate(candidate.to_string()))?;
            found
                .version(identifier)
                .cloned()
                .ok_or_else(|| TransitionError::UnknownVersion {
                    candidate: candidate.to_string(),
                    version: identifier.to_string(),
                })?
        };
        if !version.needs_native_image() {
            bail!(
                "{} {} is not an installed GraalVM without native-image",
                candidate,
                identifier
            );
        }

        self.manager
            .install_native_image(&version)
            .with_context(|| format!("Failed to install native-image for {} {}", candidate, identifier))?;

        // The tool changed the install itself; read it back rather than guess.
        let versions = catalog::relist(self.manager.as_ref(), candidate, &self.jdk_roots)?;
        lock(&self.catalog).replace_versions(candidate, versions);
        self.publish(TrayEvent::CandidateChanged(candidate.to_string()));
        self.submit_reconcile(vec![candidate.to_string()])?;
        Ok(())
    }

    fn run_flush_archives(&self) -> Result<()> {
        self.manager
            .flush_archives()
            .context("Failed to flush the archives")?;

        let changed: Vec<String> = {
            let mut catalog = lock(&self.catalog);
            let ids = catalog.ids();
            ids.into_iter()
                .filter(|id| {
                    catalog.get_mut(id).is_some_and(|candidate| {
                        let mut any = false;
                        for version in candidate.versions.iter_mut().filter(|v| v.archived) {
                            version.archived = false;
                            any = true;
                        }
                        any
                    })
                })
                .collect()
        };
        for id in changed {
            self.publish(TrayEvent::CandidateChanged(id));
        }
        self.refresh_archives_size();
        Ok(())
    }

    fn refresh_archives_size(&self) {
        let size = self.manager.archives_size();
        let status = {
            let mut catalog = lock(&self.catalog);
            let mut status = catalog.status().clone();
            if status.archives_size_bytes == size {
                return;
            }
            status.archives_size_bytes = size;
            catalog.set_status(status.clone());
            status
        };
        self.publish(TrayEvent::StatusChanged(status));
    }

    fn run_reconcile(&self, candidates: &[String]) -> Result<()> {
        let snapshot = {
            let catalog = lock(&self.catalog);
            let mut lists = lock(&self.lists);
            let mut changed = false;
            for id in candidates {
                let installed = catalog.get(id).is_some_and(Candidate::is_installed);
                changed |= lists.reconcile(id, installed)?.changed();
            }
            lists.verify(candidates.iter().map(String::as_str))?;
            changed.then(|| lists.clone())
        };
        if let Some(lists) = snapshot {
            self.publish(TrayEvent::ListsChanged(lists));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::version_manager::fake::FakeVersionManager;
    use std::thread;

    const WAIT: Duration = Duration::from_secs(10);

    fn config() -> ShogunConfig {
        ShogunConfig {
            jdk_scan_dirs: Vec::new(),
            ..ShogunConfig::default()
        }
    }

    fn installed(candidate: &str, identifier: &str) -> Version {
        let mut version = Version::available(candidate, identifier);
        version.installed = true;
        version
    }

    fn start(manager: FakeVersionManager) -> (TrayController, Arc<FakeVersionManager>) {
        let manager = Arc::new(manager);
        let controller = TrayController::new(manager.clone(), &config()).unwrap();
        controller.refresh().unwrap();
        assert!(controller.await_idle(WAIT));
        (controller, manager)
    }

    fn failures(events: &Receiver<TrayEvent>) -> Vec<String> {
        events
            .try_iter()
            .filter_map(|event| match event {
                TrayEvent::OperationFailed { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_alpha_moves_between_lists_through_its_lifecycle() {
        let (controller, manager) = start(
            FakeVersionManager::new()
                .with_candidate("alpha", &["1.0", "2.0"])
                .with_version(installed("gradle", "8.5")),
        );
        assert_eq!(controller.view_lists().available(), ["alpha"]);
        assert_eq!(controller.view_lists().installed(), ["gradle"]);

        controller.install("alpha", "1.0").unwrap();
        assert!(controller.await_idle(WAIT));
        assert_eq!(controller.view_lists().installed(), ["alpha", "gradle"]);
        assert!(controller.view_lists().available().is_empty());
        let version = controller.candidate("alpha").unwrap().version("1.0").cloned().unwrap();
        assert!(version.installed && !version.in_use);

        controller.set_default("alpha", "1.0").unwrap();
        assert!(controller.await_idle(WAIT));
        let alpha = controller.candidate("alpha").unwrap();
        assert_eq!(alpha.in_use().map(|v| v.identifier.as_str()), Some("1.0"));
        assert_eq!(menu::candidate_label(&alpha), "alpha > 1.0");

        controller.uninstall("alpha", "1.0").unwrap();
        assert!(controller.await_idle(WAIT));
        assert_eq!(controller.view_lists().available(), ["alpha"]);
        assert_eq!(controller.view_lists().installed(), ["gradle"]);
        assert!(controller.candidate("alpha").unwrap().in_use().is_none());

        assert_eq!(
            manager.calls(),
            vec!["install alpha 1.0", "default alpha 1.0", "uninstall alpha 1.0"]
        );
        assert_eq!(controller.gate().in_flight(), 0);
    }

    #[test]
    fn test_concurrent_installs_land_in_alphabetical_order() {
        let (controller, _manager) = start(
            FakeVersionManager::new()
                .with_candidate("maven", &["3.9.6"])
                .with_candidate("ant", &["1.10"])
                .with_version(installed("java", "21.0.2-tem"))
                .with_version(installed("scala", "3.4"))
                .with_delay(Duration::from_millis(10)),
        );

        let handles: Vec<_> = [("maven", "3.9.6"), ("ant", "1.10")]
            .into_iter()
            .map(|(candidate, identifier)| {
                let controller = controller.clone();
                thread::spawn(move || controller.install(candidate, identifier).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(controller.await_idle(WAIT));
        assert_eq!(controller.gate().in_flight(), 0);
        assert_eq!(
            controller.view_lists().installed(),
            ["ant", "java", "maven", "scala"]
        );
        assert!(controller.view_lists().available().is_empty());
    }

    #[test]
    fn test_external_failure_leaves_state_untouched() {
        let (controller, manager) = start(
            FakeVersionManager::new()
                .with_candidate("alpha", &["1.0"])
                .with_candidate("beta", &["1.0"]),
        );
        let events = controller.subscribe();
        manager.fail_on("alpha");
        let before = controller.candidate("alpha").unwrap();
        let lists_before = controller.view_lists();

        controller.install("alpha", "1.0").unwrap();
        controller.install("beta", "1.0").unwrap();
        assert!(controller.await_idle(WAIT));

        assert_eq!(controller.candidate("alpha").unwrap(), before);
        assert_ne!(controller.view_lists(), lists_before, "beta still installed");
        assert_eq!(controller.view_lists().installed(), ["beta"]);
        let failures = failures(&events);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("simulated failure"), "{:?}", failures);
        assert_eq!(controller.gate().in_flight(), 0);
    }

    #[test]
    fn test_illegal_request_is_refused_before_the_tool_runs() {
        let (controller, manager) = start(FakeVersionManager::new().with_candidate("alpha", &["1.0"]));
        let events = controller.subscribe();

        assert!(matches!(
            controller.check("alpha", "1.0", Action::Uninstall),
            Err(TransitionError::IllegalTransition { .. })
        ));
        assert!(matches!(
            controller.check("zeta", "1.0", Action::Install),
            Err(TransitionError::UnknownCandidate(_))
        ));

        controller.uninstall("alpha", "1.0").unwrap();
        controller.set_default("alpha", "1.0").unwrap();
        assert!(controller.await_idle(WAIT));

        assert!(manager.calls().is_empty());
        assert_eq!(failures(&events).len(), 2);
        assert_eq!(controller.view_lists().available(), ["alpha"]);
    }

    #[test]
    fn test_set_default_keeps_exactly_one_in_use() {
        let mut current = installed("java", "17.0.10-tem");
        current.in_use = true;
        let (controller, _manager) = start(
            FakeVersionManager::new()
                .with_version(current)
                .with_version(installed("java", "21.0.2-tem")),
        );
        let events = controller.subscribe();

        controller.set_default("java", "21.0.2-tem").unwrap();
        assert!(controller.await_idle(WAIT));

        let java = controller.candidate("java").unwrap();
        let in_use: Vec<_> = java.versions.iter().filter(|v| v.in_use).collect();
        assert_eq!(in_use.len(), 1);
        assert_eq!(in_use[0].identifier, "21.0.2-tem");
        let events: Vec<_> = events.try_iter().collect();
        assert_eq!(events, vec![TrayEvent::CandidateChanged("java".to_string())]);
    }

    #[test]
    fn test_repeated_refresh_does_not_reorder_lists() {
        let (controller, _manager) = start(
            FakeVersionManager::new()
                .with_candidate("zig", &["0.11"])
                .with_candidate("ant", &["1.10"])
                .with_version(installed("java", "21.0.2-tem")),
        );
        let first = controller.view_lists();
        let events = controller.subscribe();

        controller.refresh().unwrap();
        assert!(controller.await_idle(WAIT));

        assert_eq!(controller.view_lists(), first);
        assert!(
            !events
                .try_iter()
                .any(|event| matches!(event, TrayEvent::ListsChanged(_))),
            "an unchanged refresh must not repaint the lists"
        );
    }

    #[test]
    fn test_update_tool_chains_a_refresh_on_the_same_worker() {
        let (controller, manager) = start(
            FakeVersionManager::new()
                .with_candidate("ant", &["1.10"])
                .with_update(),
        );
        assert!(controller.status().update_available);

        controller.update_tool().unwrap();
        assert!(controller.await_idle(WAIT), "the chained refresh must not deadlock");

        assert_eq!(manager.calls(), vec!["update tool"]);
        assert!(!controller.status().update_available);
    }

    #[test]
    fn test_archives_are_removed_and_flushed() {
        let mut cached = Version::available("maven", "3.8.8");
        cached.archived = true;
        let mut other = Version::available("gradle", "8.5");
        other.archived = true;
        let (controller, manager) = start(
            FakeVersionManager::new()
                .with_version(cached)
                .with_version(other)
                .with_version(Version::available("maven", "3.9.6")),
        );
        assert_eq!(controller.status().archives_size_bytes, 2048);
        assert!(controller.menu().archives.is_some());

        controller.remove_archive("maven", "3.8.8").unwrap();
        assert!(controller.await_idle(WAIT));
        assert!(!controller.candidate("maven").unwrap().version("3.8.8").unwrap().archived);
        assert_eq!(controller.status().archives_size_bytes, 1024);

        controller.flush_archives().unwrap();
        assert!(controller.await_idle(WAIT));
        assert!(!controller.candidate("gradle").unwrap().version("8.5").unwrap().archived);
        assert_eq!(controller.status().archives_size_bytes, 0);
        assert!(controller.menu().archives.is_none());
        assert_eq!(manager.calls(), vec!["remove-archive maven 3.8.8", "flush archives"]);
    }

    #[test]
    fn test_registering_detected_version_makes_candidate_installed() {
        let detected = Version::detected("java", "zulu-17", PathBuf::from("/jvm/zulu-17"));
        let (controller, _manager) = start(
            FakeVersionManager::new()
                .with_candidate("java", &["21.0.2-tem"])
                .with_version(detected),
        );
        assert_eq!(controller.view_lists().available(), ["java"]);

        controller.install("java", "zulu-17").unwrap();
        assert!(controller.await_idle(WAIT));

        assert_eq!(controller.view_lists().installed(), ["java"]);
        let version = controller.candidate("java").unwrap().version("zulu-17").cloned().unwrap();
        assert!(version.locally_installed);
        assert_eq!(menu::version_label(&version), "  zulu-17 (local only)");
    }

    #[test]
    fn test_version_order_after_install_survives_refresh() {
        let (controller, _manager) = start(FakeVersionManager::new().with_candidate("alpha", &["1.0", "2.0", "3.0"]));
        let order = |controller: &TrayController| -> Vec<String> {
            controller
                .candidate("alpha")
                .unwrap()
                .versions
                .iter()
                .map(|v| v.identifier.clone())
                .collect()
        };

        controller.install("alpha", "3.0").unwrap();
        assert!(controller.await_idle(WAIT));
        let after_install = order(&controller);
        assert_eq!(after_install, vec!["3.0", "1.0", "2.0"]);

        controller.refresh().unwrap();
        assert!(controller.await_idle(WAIT));
        assert_eq!(order(&controller), after_install);

        controller.uninstall("alpha", "3.0").unwrap();
        assert!(controller.await_idle(WAIT));
        let after_uninstall = order(&controller);
        assert_eq!(after_uninstall, vec!["1.0", "2.0", "3.0"]);

        controller.refresh().unwrap();
        assert!(controller.await_idle(WAIT));
        assert_eq!(order(&controller), after_uninstall);
    }

    #[test]
    fn test_uninstall_keeps_archive_and_offers_its_removal() {
        let (controller, manager) = start(FakeVersionManager::new().with_version(installed("maven", "3.9.6")));
        assert_eq!(controller.status().archives_size_bytes, 0);

        controller.uninstall("maven", "3.9.6").unwrap();
        assert!(controller.await_idle(WAIT));

        let version = controller.candidate("maven").unwrap().version("3.9.6").cloned().unwrap();
        assert!(version.archived && !version.is_present());
        assert!(menu::version_actions(&version).contains(&menu::MenuAction::RemoveArchive));
        assert_eq!(controller.status().archives_size_bytes, 1024);

        controller.remove_archive("maven", "3.9.6").unwrap();
        assert!(controller.await_idle(WAIT));
        assert_eq!(controller.status().archives_size_bytes, 0);
        assert_eq!(manager.calls(), vec!["uninstall maven 3.9.6", "remove-archive maven 3.9.6"]);
    }

    #[test]
    fn test_native_image_is_added_to_graal_only() {
        let (controller, manager) = start(
            FakeVersionManager::new()
                .with_version(installed("java", "21.0.2-graalce"))
                .with_version(installed("java", "21.0.2-tem")),
        );
        let events = controller.subscribe();
        let graal = || controller.candidate("java").unwrap().version("21.0.2-graalce").cloned().unwrap();
        assert!(menu::version_actions(&graal()).contains(&menu::MenuAction::InstallNativeImage));

        controller.install_native_image("java", "21.0.2-tem").unwrap();
        controller.install_native_image("java", "21.0.2-graalce").unwrap();
        assert!(controller.await_idle(WAIT));

        assert!(graal().native_image);
        assert!(!menu::version_actions(&graal()).contains(&menu::MenuAction::InstallNativeImage));
        assert_eq!(manager.calls(), vec!["native-image java 21.0.2-graalce"]);
        assert_eq!(failures(&events).len(), 1, "temurin has no native-image to add");
        assert_eq!(controller.view_lists().installed(), ["java"]);
    }

    #[test]
    fn test_offline_refresh_lists_only_installed() {
        let (controller, _manager) = start(
            FakeVersionManager::new()
                .with_candidate("ant", &["1.10"])
                .with_version(installed("java", "21.0.2-tem"))
                .offline(),
        );
        assert_eq!(controller.view_lists().installed(), ["java"]);
        assert!(controller.view_lists().available().is_empty());
        assert!(controller.status().offline);
    }
}
