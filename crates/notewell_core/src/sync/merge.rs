//! Content merge for conflicting note pairs.
//!
//! # Responsibility
//! - Combine two divergent bodies of one logical note without losing text.
//!
//! # Invariants
//! - Deterministic: equal inputs always produce equal output.
//! - Idempotent under retry: re-merging a side against an earlier merge
//!   result returns that result unchanged.

/// Divider between the two bodies when neither contains the other.
pub const MERGE_DIVIDER: &str = "\n\n---\n\n";

/// Merges a local and a cloud body into one converged body.
///
/// Policy, in order:
/// 1. Equal inputs: the text as-is.
/// 2. One side contains the other: the superset wins. This is what makes a
///    retried resolver pass stable: after a merge write, the cloud body
///    contains the local body, so a second pass returns the cloud body
///    unchanged instead of stacking dividers.
/// 3. Otherwise: local body, divider, cloud body.
///
/// Marker-style merges (diff3 conflict markers) were rejected because
/// re-merging marked text would nest markers and break idempotence.
pub fn merge_contents(local: &str, cloud: &str) -> String {
    if local == cloud {
        return local.to_string();
    }
    if cloud.contains(local) {
        return cloud.to_string();
    }
    if local.contains(cloud) {
        return local.to_string();
    }
    format!("{local}{MERGE_DIVIDER}{cloud}")
}
