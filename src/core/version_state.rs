// src/core/version_state.rs

//! # Version State Machine
//!
//! Pure rules deciding whether an action is legal for a version and which status
//! facets it changes. Nothing here talks to the version manager: callers
//! validate first, delegate the external call, and only apply the transition
//! once the external tool has reported success.

use crate::models::{Candidate, Version};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Presence facet of a version. `LocallyInstalled` wins over `Installed`,
/// which wins over `Detected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Presence {
    Available,
    Detected,
    Installed,
    LocallyInstalled,
}

/// The meaningful state of a version: its presence plus the orthogonal bits
/// that apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionState {
    pub presence: Presence,
    /// Only ever `true` when present.
    pub in_use: bool,
    /// Only ever `true` when not present.
    pub archived: bool,
}

impl VersionState {
    pub fn of(version: &Version) -> Self {
        let presence = if version.locally_installed {
            Presence::LocallyInstalled
        } else if version.installed {
            Presence::Installed
        } else if version.detected {
            Presence::Detected
        } else {
            Presence::Available
        };
        let present = matches!(presence, Presence::Installed | Presence::LocallyInstalled);
        Self {
            presence,
            in_use: present && version.in_use,
            archived: !present && version.archived,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(
            self.presence,
            Presence::Installed | Presence::LocallyInstalled
        )
    }
}

impl fmt::Display for VersionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.presence)?;
        if self.in_use {
            f.write_str("+InUse")?;
        }
        if self.archived {
            f.write_str("+Archived")?;
        }
        Ok(())
    }
}

/// A mutating request against one version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    Install,
    Uninstall,
    SetDefault,
    RemoveArchive,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
            Self::SetDefault => "set default",
            Self::RemoveArchive => "remove archive",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Cannot {action} {candidate} {version}: it is {state}.")]
    IllegalTransition {
        candidate: String,
        version: String,
        action: Action,
        state: VersionState,
    },
    #[error("Unknown candidate '{0}'.")]
    UnknownCandidate(String),
    #[error("Candidate '{candidate}' has no version '{version}'.")]
    UnknownVersion { candidate: String, version: String },
}

/// What an applied transition changed, for logging and repaint decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub action: Action,
    pub version: String,
    pub before: VersionState,
    pub after: VersionState,
    /// For `SetDefault`: the version that lost its default status, if any.
    pub previous_default: Option<String>,
}

// --- Legality ---

pub fn is_legal(state: VersionState, action: Action) -> bool {
    match action {
        Action::Install => matches!(state.presence, Presence::Available | Presence::Detected),
        Action::Uninstall => state.is_present(),
        Action::SetDefault => state.is_present(),
        Action::RemoveArchive => state.archived && !state.is_present(),
    }
}

/// Every action the version currently allows, in menu order.
pub fn permitted_actions(version: &Version) -> Vec<Action> {
    let state = VersionState::of(version);
    [
        Action::SetDefault,
        Action::Uninstall,
        Action::Install,
        Action::RemoveArchive,
    ]
    .into_iter()
    .filter(|action| is_legal(state, *action))
    // Already the default: nothing to do, so no affordance either.
    .filter(|action| !(*action == Action::SetDefault && state.in_use))
    .collect()
}

fn find<'a>(candidate: &'a Candidate, identifier: &str) -> Result<&'a Version, TransitionError> {
    candidate
        .version(identifier)
        .ok_or_else(|| TransitionError::UnknownVersion {
            candidate: candidate.id.clone(),
            version: identifier.to_string(),
        })
}

/// Refuses `action` unless the version's current state permits it.
pub fn validate(
    candidate: &Candidate,
    identifier: &str,
    action: Action,
) -> Result<VersionState, TransitionError> {
    let state = VersionState::of(find(candidate, identifier)?);
    if is_legal(state, action) {
        Ok(state)
    } else {
        Err(TransitionError::IllegalTransition {
            candidate: candidate.id.clone(),
            version: identifier.to_string(),
            action,
            state,
        })
    }
}

// --- Application ---

/// Applies a transition the external tool has already carried out.
///
/// Legality is checked again so that a stale request cannot corrupt the
/// catalog; on error nothing is modified.
pub fn apply(
    candidate: &mut Candidate,
    identifier: &str,
    action: Action,
) -> Result<TransitionOutcome, TransitionError> {
    let before = validate(candidate, identifier, action)?;
    let mut previous_default = None;

    match action {
        Action::Install => {
            let version = version_mut(candidate, identifier)?;
            if version.detected {
                // Registering a detected install. `detected` stays set so an
                // uninstall brings the version back to Detected.
                version.locally_installed = true;
            } else {
                version.installed = true;
            }
        }
        Action::Uninstall => {
            let version = version_mut(candidate, identifier)?;
            version.installed = false;
            version.locally_installed = false;
            // No replacement default is picked; the tool reassigns one on refresh.
            version.in_use = false;
        }
        Action::SetDefault => {
            // Compute both sides of the switch first, then publish them together.
            let old_index = candidate.versions.iter().position(|v| v.in_use);
            let new_index = candidate
                .versions
                .iter()
                .position(|v| v.identifier == identifier)
                .ok_or_else(|| TransitionError::UnknownVersion {
                    candidate: candidate.id.clone(),
                    version: identifier.to_string(),
                })?;
            for (index, version) in candidate.versions.iter_mut().enumerate() {
                if Some(index) == old_index && index != new_index {
                    previous_default = Some(version.identifier.clone());
                }
                version.in_use = index == new_index;
            }
        }
        Action::RemoveArchive => {
            version_mut(candidate, identifier)?.archived = false;
        }
    }

    let after = VersionState::of(find(candidate, identifier)?);
    log::debug!(
        "{} {} {}: {} -> {}",
        action,
        candidate.id,
        identifier,
        before,
        after
    );
    Ok(TransitionOutcome {
        action,
        version: identifier.to_string(),
        before,
        after,
        previous_default,
    })
}

fn version_mut<'a>(
    candidate: &'a mut Candidate,
    identifier: &str,
) -> Result<&'a mut Version, TransitionError> {
    let candidate_id = candidate.id.clone();
    candidate
        .version_mut(identifier)
        .ok_or(TransitionError::UnknownVersion {
            candidate: candidate_id,
            version: identifier.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn alpha() -> Candidate {
        let mut candidate = Candidate::new("alpha");
        candidate.versions = vec![
            Version::available("alpha", "1.0"),
            Version::available("alpha", "2.0"),
            Version::detected("alpha", "0.9", PathBuf::from("/opt/alpha-0.9")),
        ];
        candidate
    }

    fn in_use_count(candidate: &Candidate) -> usize {
        candidate.versions.iter().filter(|v| v.in_use).count()
    }

    #[test]
    fn test_state_classification_precedence() {
        let mut version = Version::available("alpha", "1.0");
        assert_eq!(VersionState::of(&version).presence, Presence::Available);
        version.detected = true;
        assert_eq!(VersionState::of(&version).presence, Presence::Detected);
        version.installed = true;
        assert_eq!(VersionState::of(&version).presence, Presence::Installed);
        version.locally_installed = true;
        assert_eq!(VersionState::of(&version).presence, Presence::LocallyInstalled);
    }

    #[test]
    fn test_orthogonal_bits_only_where_meaningful() {
        let mut version = Version::available("alpha", "1.0");
        version.in_use = true;
        version.archived = true;
        let state = VersionState::of(&version);
        assert!(!state.in_use, "in use needs presence");
        assert!(state.archived);

        version.installed = true;
        let state = VersionState::of(&version);
        assert!(state.in_use);
        assert!(!state.archived, "archive is meaningless while installed");
    }

    #[test]
    fn test_install_then_uninstall_round_trips_presence() {
        let mut candidate = alpha();
        let before = candidate.version("1.0").unwrap().clone();

        let outcome = apply(&mut candidate, "1.0", Action::Install).unwrap();
        assert_eq!(outcome.after.presence, Presence::Installed);
        assert!(!outcome.after.in_use);

        apply(&mut candidate, "1.0", Action::SetDefault).unwrap();
        apply(&mut candidate, "1.0", Action::Uninstall).unwrap();

        let after = candidate.version("1.0").unwrap();
        assert_eq!(after.installed, before.installed);
        assert_eq!(after.locally_installed, before.locally_installed);
        assert_eq!(after.detected, before.detected);
        assert!(!after.in_use, "in use is never restored");
        assert_eq!(in_use_count(&candidate), 0);
    }

    #[test]
    fn test_registering_detected_version_round_trips() {
        let mut candidate = alpha();
        let outcome = apply(&mut candidate, "0.9", Action::Install).unwrap();
        assert_eq!(outcome.before.presence, Presence::Detected);
        assert_eq!(outcome.after.presence, Presence::LocallyInstalled);

        let outcome = apply(&mut candidate, "0.9", Action::Uninstall).unwrap();
        assert_eq!(outcome.after.presence, Presence::Detected);
    }

    #[test]
    fn test_set_default_switches_exactly_one() {
        let mut candidate = alpha();
        apply(&mut candidate, "1.0", Action::Install).unwrap();
        apply(&mut candidate, "2.0", Action::Install).unwrap();

        let first = apply(&mut candidate, "1.0", Action::SetDefault).unwrap();
        assert_eq!(first.previous_default, None);
        assert_eq!(candidate.in_use().unwrap().identifier, "1.0");

        let second = apply(&mut candidate, "2.0", Action::SetDefault).unwrap();
        assert_eq!(second.previous_default.as_deref(), Some("1.0"));
        assert_eq!(in_use_count(&candidate), 1);
        assert_eq!(candidate.in_use().unwrap().identifier, "2.0");

        let again = apply(&mut candidate, "2.0", Action::SetDefault).unwrap();
        assert_eq!(again.previous_default, None);
        assert_eq!(in_use_count(&candidate), 1);
    }

    #[test]
    fn test_illegal_transitions_are_refused_without_change() {
        let mut candidate = alpha();
        let snapshot = candidate.clone();

        let err = apply(&mut candidate, "1.0", Action::Uninstall).unwrap_err();
        assert!(matches!(
            err,
            TransitionError::IllegalTransition { action: Action::Uninstall, .. }
        ));
        assert!(apply(&mut candidate, "1.0", Action::SetDefault).is_err());
        assert!(apply(&mut candidate, "1.0", Action::RemoveArchive).is_err());
        assert!(matches!(
            apply(&mut candidate, "9.9", Action::Install),
            Err(TransitionError::UnknownVersion { .. })
        ));
        assert_eq!(candidate, snapshot);

        apply(&mut candidate, "1.0", Action::Install).unwrap();
        assert!(apply(&mut candidate, "1.0", Action::Install).is_err());
    }

    #[test]
    fn test_remove_archive_only_when_archived_and_absent() {
        let mut candidate = alpha();
        candidate.version_mut("2.0").unwrap().archived = true;
        let outcome = apply(&mut candidate, "2.0", Action::RemoveArchive).unwrap();
        assert!(!outcome.after.archived);
        assert!(apply(&mut candidate, "2.0", Action::RemoveArchive).is_err());

        candidate.version_mut("1.0").unwrap().archived = true;
        apply(&mut candidate, "1.0", Action::Install).unwrap();
        assert!(apply(&mut candidate, "1.0", Action::RemoveArchive).is_err());
    }

    #[test]
    fn test_permitted_actions_follow_state() {
        let mut version = Version::available("alpha", "1.0");
        assert_eq!(permitted_actions(&version), vec![Action::Install]);

        version.archived = true;
        assert_eq!(
            permitted_actions(&version),
            vec![Action::Install, Action::RemoveArchive]
        );

        version.installed = true;
        assert_eq!(
            permitted_actions(&version),
            vec![Action::SetDefault, Action::Uninstall]
        );

        version.in_use = true;
        assert_eq!(permitted_actions(&version), vec![Action::Uninstall]);
    }
}
