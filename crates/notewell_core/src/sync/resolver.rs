//! Dual-store conflict detection and resolution.
//!
//! # Responsibility
//! - Compare one owner's local note set against their cloud note set.
//! - Apply a resolution strategy per conflicting pair and converge both
//!   stores, tolerating per-note write failures.
//!
//! # Invariants
//! - Sync direction is local to cloud; cloud is the converged destination.
//! - Pairs are matched by case-sensitive exact title equality. Renamed
//!   notes therefore look unrelated; known limitation, kept for
//!   compatibility with the stores' independent id spaces.
//! - Writes are sequential; one note's failure never aborts the pass.

use crate::model::{NewNote, Note, NoteId, OwnerId};
use crate::store::{NoteStore, StoreError};
use crate::sync::merge::merge_contents;
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// How a conflicting pair is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolutionStrategy {
    /// Local content overwrites the cloud copy.
    Local,
    /// Cloud wins; the local mirror is refreshed from cloud.
    Cloud,
    /// Both bodies are combined via `merge_contents`.
    Merge,
    /// Per-note overrides decide; pairs without an override fall back to
    /// the global default.
    Manual,
}

impl ConflictResolutionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Cloud => "cloud",
            Self::Merge => "merge",
            Self::Manual => "manual",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Some(Self::Local),
            "cloud" => Some(Self::Cloud),
            "merge" => Some(Self::Merge),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

/// A local/cloud pair judged to be the same logical note with differing
/// content. Exists only transiently during a sync pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictedNote {
    pub local: Note,
    pub cloud: Note,
}

/// Result of a detection pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSummary {
    pub local_count: usize,
    pub cloud_count: usize,
    pub conflicts: Vec<ConflictedNote>,
}

/// Outcome of an apply pass.
///
/// `failures` carries per-note errors from a partial-failure-tolerant run;
/// the pass itself still returns `Ok`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Local-only notes copied into the cloud store.
    pub copied: usize,
    /// Conflicting pairs converged.
    pub resolved: usize,
    /// Pairs left untouched (global `manual` without an override).
    pub unresolved: usize,
    /// Per-note failures, in processing order.
    pub failures: Vec<(NoteId, String)>,
}

pub type SyncResult<T> = Result<T, SyncError>;

/// Failure that aborts a whole sync pass (reading either store).
#[derive(Debug)]
pub enum SyncError {
    Store(StoreError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Reconciles one owner's notes across the two store backends.
pub struct ConflictResolver<L: NoteStore, C: NoteStore> {
    local: L,
    cloud: C,
}

impl<L: NoteStore, C: NoteStore> ConflictResolver<L, C> {
    pub fn new(local: L, cloud: C) -> Self {
        Self { local, cloud }
    }

    /// Loads both sets and classifies every local note.
    ///
    /// Local-only notes are counted but not conflicting; cloud-only notes
    /// are ignored (cloud is already canonical for them); pairs with equal
    /// content are converged already; pairs with differing content become
    /// conflicts.
    pub fn detect(&self, owner: OwnerId) -> SyncResult<SyncSummary> {
        let local_notes = self.local.get(owner)?;
        let cloud_notes = self.cloud.get(owner)?;

        let cloud_by_title: BTreeMap<&str, &Note> = cloud_notes
            .iter()
            .map(|note| (note.title.as_str(), note))
            .collect();

        let mut conflicts = Vec::new();
        for local_note in &local_notes {
            if let Some(cloud_note) = cloud_by_title.get(local_note.title.as_str()) {
                if local_note.content != cloud_note.content {
                    conflicts.push(ConflictedNote {
                        local: local_note.clone(),
                        cloud: (*cloud_note).clone(),
                    });
                }
            }
        }

        info!(
            "event=sync_detect module=sync status=ok owner={owner} local={} cloud={} conflicts={}",
            local_notes.len(),
            cloud_notes.len(),
            conflicts.len()
        );
        Ok(SyncSummary {
            local_count: local_notes.len(),
            cloud_count: cloud_notes.len(),
            conflicts,
        })
    }

    /// Converges both stores for one owner.
    ///
    /// Local-only notes are copied into the cloud store. Each conflicting
    /// pair resolves with `overrides[local id]`, falling back to `global`.
    /// An effective `Manual` (global manual, no override for the pair) is
    /// left unresolved rather than guessing a winner.
    ///
    /// Writes run note-by-note; a failure is logged, recorded in the
    /// report, and the pass continues. Only the initial reads can fail the
    /// whole pass, since the two stores offer no cross-store transaction.
    pub fn apply(
        &self,
        owner: OwnerId,
        global: ConflictResolutionStrategy,
        overrides: &BTreeMap<NoteId, ConflictResolutionStrategy>,
    ) -> SyncResult<SyncReport> {
        let local_notes = self.local.get(owner)?;
        let summary = self.detect(owner)?;

        let cloud_titles: Vec<String> = self
            .cloud
            .get(owner)?
            .into_iter()
            .map(|note| note.title)
            .collect();

        let mut report = SyncReport::default();

        for local_note in &local_notes {
            if cloud_titles.iter().any(|title| title == &local_note.title) {
                continue;
            }
            match self.cloud.create(&NewNote::from_note(local_note)) {
                Ok(_) => report.copied += 1,
                Err(err) => {
                    warn!(
                        "event=sync_copy module=sync status=error note_id={} error={err}",
                        local_note.id
                    );
                    report.failures.push((local_note.id, err.to_string()));
                }
            }
        }

        for pair in &summary.conflicts {
            let strategy = overrides
                .get(&pair.local.id)
                .copied()
                .filter(|s| *s != ConflictResolutionStrategy::Manual)
                .unwrap_or(global);
            if strategy == ConflictResolutionStrategy::Manual {
                warn!(
                    "event=sync_resolve module=sync status=unresolved note_id={} title_len={}",
                    pair.local.id,
                    pair.local.title.len()
                );
                report.unresolved += 1;
                continue;
            }

            match self.resolve_pair(pair, strategy) {
                Ok(()) => report.resolved += 1,
                Err(err) => {
                    warn!(
                        "event=sync_resolve module=sync status=error note_id={} strategy={} error={err}",
                        pair.local.id,
                        strategy.as_str()
                    );
                    report.failures.push((pair.local.id, err.to_string()));
                }
            }
        }

        info!(
            "event=sync_apply module=sync status=ok owner={owner} copied={} resolved={} unresolved={} failed={}",
            report.copied,
            report.resolved,
            report.unresolved,
            report.failures.len()
        );
        Ok(report)
    }

    fn resolve_pair(
        &self,
        pair: &ConflictedNote,
        strategy: ConflictResolutionStrategy,
    ) -> Result<(), StoreError> {
        match strategy {
            ConflictResolutionStrategy::Local => {
                self.cloud.update_content(pair.cloud.id, &pair.local.content)
            }
            ConflictResolutionStrategy::Cloud => {
                // Cloud wins without a cloud write; the local working copy
                // is refreshed so it stays usable offline.
                self.local.update_content(pair.local.id, &pair.cloud.content)
            }
            ConflictResolutionStrategy::Merge => {
                let merged = merge_contents(&pair.local.content, &pair.cloud.content);
                self.cloud.update_content(pair.cloud.id, &merged)?;
                self.local.update_content(pair.local.id, &merged)
            }
            ConflictResolutionStrategy::Manual => unreachable!("filtered before dispatch"),
        }
    }
}
