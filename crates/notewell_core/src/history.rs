//! Version-history policy.
//!
//! # Responsibility
//! - Decide whether a content transition deserves a permanent version entry.
//! - Build entries and bound history growth.
//!
//! # Invariants
//! - `prune` is idempotent: pruning an already pruned, already sorted list
//!   is a no-op.
//! - Entries keep audit metadata even when the full snapshot is omitted.

use crate::config::TrackerConfig;
use crate::diff::estimate;
use crate::model::{EditKind, VersionEntry};

/// Returns whether the transition from `old` to `new` qualifies for a new
/// version entry.
///
/// Evaluated once per editing session at session end, never per keystroke.
pub fn should_commit(old: &str, new: &str, cfg: &TrackerConfig) -> bool {
    let est = estimate(old, new, cfg.significant_change_threshold);
    est.characters_changed >= cfg.min_change_threshold
        || est.change_percentage >= cfg.min_change_percentage
}

/// Builds a version entry for the transition from `old` to `new`.
///
/// The full snapshot is stored only when the change is significant; smaller
/// changes that still crossed the commit threshold keep length and
/// percentage for audit without the text.
pub fn build_entry(
    old: &str,
    new: &str,
    edit_kind: EditKind,
    now_ms: i64,
    cfg: &TrackerConfig,
) -> VersionEntry {
    let est = estimate(old, new, cfg.significant_change_threshold);
    VersionEntry {
        timestamp_ms: now_ms,
        edit_kind,
        content_snapshot: est.is_significant.then(|| new.to_string()),
        content_length: new.chars().count(),
        change_percentage: est.change_percentage,
    }
}

/// Bounds `history` to its `max_versions` most recent entries.
///
/// Sorts newest-first (stable, so equal timestamps keep their relative
/// order) and truncates.
pub fn prune(history: &mut Vec<VersionEntry>, max_versions: usize) {
    history.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
    history.truncate(max_versions);
}
