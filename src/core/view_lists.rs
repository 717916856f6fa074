// src/core/view_lists.rs

//! # View List Synchronizer
//!
//! Two alphabetically ordered lists of candidate identifiers: the ones with at
//! least one present version ("installed") and the rest ("available"). A
//! candidate lives in exactly one of them. All edits run on the UI queue while
//! holding the lists' lock, so an observer never sees a candidate in both
//! lists or in neither.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Placement {
    Installed,
    Available,
}

impl Placement {
    pub fn for_membership(installed: bool) -> Self {
        if installed {
            Self::Installed
        } else {
            Self::Available
        }
    }
}

/// What `reconcile` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Unchanged,
    /// First time the candidate is placed.
    Inserted(Placement),
    Moved { from: Placement, to: Placement },
}

impl ReconcileOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewListError {
    /// Unreachable unless a list was edited outside `reconcile`.
    #[error("Candidate '{candidate}' appears in both view lists.")]
    InvariantViolation { candidate: String },
}

/// The installed and available lists, each sorted by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewLists {
    installed: Vec<String>,
    available: Vec<String>,
}

impl ViewLists {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn installed(&self) -> &[String] {
        &self.installed
    }

    pub fn available(&self) -> &[String] {
        &self.available
    }

    fn list(&self, placement: Placement) -> &Vec<String> {
        match placement {
            Placement::Installed => &self.installed,
            Placement::Available => &self.available,
        }
    }

    fn list_mut(&mut self, placement: Placement) -> &mut Vec<String> {
        match placement {
            Placement::Installed => &mut self.installed,
            Placement::Available => &mut self.available,
        }
    }

    fn position(&self, placement: Placement, candidate: &str) -> Option<usize> {
        self.list(placement)
            .binary_search_by(|entry| entry.as_str().cmp(candidate))
            .ok()
    }

    /// Where the candidate currently is, if anywhere.
    pub fn placement_of(&self, candidate: &str) -> Result<Option<Placement>, ViewListError> {
        let in_installed = self.position(Placement::Installed, candidate).is_some();
        let in_available = self.position(Placement::Available, candidate).is_some();
        match (in_installed, in_available) {
            (true, true) => {
                debug_assert!(false, "candidate '{}' is in both view lists", candidate);
                Err(ViewListError::InvariantViolation {
                    candidate: candidate.to_string(),
                })
            }
            (true, false) => Ok(Some(Placement::Installed)),
            (false, true) => Ok(Some(Placement::Available)),
            (false, false) => Ok(None),
        }
    }

    /// Puts the candidate in the list matching `installed`, moving it out of the
    /// other list when its membership flipped. Untouched entries keep their
    /// relative order; repeated calls with the same membership change nothing.
    pub fn reconcile(
        &mut self,
        candidate: &str,
        installed: bool,
    ) -> Result<ReconcileOutcome, ViewListError> {
        let target = Placement::for_membership(installed);
        let outcome = match self.placement_of(candidate)? {
            Some(current) if current == target => return Ok(ReconcileOutcome::Unchanged),
            Some(current) => {
                if let Some(index) = self.position(current, candidate) {
                    self.list_mut(current).remove(index);
                }
                ReconcileOutcome::Moved {
                    from: current,
                    to: target,
                }
            }
            None => ReconcileOutcome::Inserted(target),
        };

        let list = self.list_mut(target);
        // First entry that sorts after the candidate.
        let index = list.partition_point(|entry| entry.as_str() <= candidate);
        list.insert(index, candidate.to_string());
        log::debug!("View lists: '{}' {:?}", candidate, outcome);
        Ok(outcome)
    }

    /// Checks every candidate is in exactly one list and both lists are sorted.
    pub fn verify<'a>(
        &self,
        candidates: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), ViewListError> {
        for candidate in candidates {
            if self.placement_of(candidate)?.is_none() {
                return Err(ViewListError::InvariantViolation {
                    candidate: candidate.to_string(),
                });
            }
        }
        debug_assert!(self.installed.is_sorted());
        debug_assert!(self.available.is_sorted());
        Ok(())
    }
}
