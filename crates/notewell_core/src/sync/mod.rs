//! Dual-store reconciliation.

pub mod merge;
pub mod resolver;

pub use merge::merge_contents;
pub use resolver::{
    ConflictResolutionStrategy, ConflictResolver, ConflictedNote, SyncError, SyncReport,
    SyncSummary,
};
