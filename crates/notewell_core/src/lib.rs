//! Change-tracking and dual-store reconciliation core for Notewell.
//! This crate is the single source of truth for autosave, version-history
//! and sync-conflict invariants; UI and transport layers stay thin.

pub mod config;
pub mod db;
pub mod diff;
pub mod history;
pub mod logging;
pub mod model;
pub mod schedule;
pub mod store;
pub mod sync;
pub mod tracker;

pub use config::TrackerConfig;
pub use diff::{estimate, TextDiffEstimate};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{EditKind, NewNote, Note, NoteFieldPatch, NoteId, OwnerId, VersionEntry};
pub use schedule::{Clock, ManualClock, SystemClock, TimerKind, TimerQueue};
pub use store::{MemoryNoteStore, NoteStore, SqliteNoteStore, StoreError, StoreResult};
pub use sync::{
    merge_contents, ConflictResolutionStrategy, ConflictResolver, ConflictedNote, SyncError,
    SyncReport, SyncSummary,
};
pub use tracker::{ChangeTracker, TrackerError, FORCE_SAVE_COALESCE_WINDOW_MS};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
