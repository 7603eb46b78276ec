//! Tracker configuration surface.
//!
//! # Responsibility
//! - Hold every tunable threshold and interval in one place.
//! - Document the defaults the rest of the core assumes.
//!
//! # Invariants
//! - Replacing the config at runtime never rewires timers already armed;
//!   new values apply when the next timer is armed.

/// Default quiet period before a pending edit is autosaved.
pub const DEFAULT_AUTOSAVE_INTERVAL_MS: i64 = 45_000;

/// Default inactivity window that ends an editing session.
pub const DEFAULT_SESSION_TIMEOUT_MS: i64 = 180_000;

/// Default minimum session length eligible for a history commit.
pub const DEFAULT_MIN_SESSION_DURATION_MS: i64 = 30_000;

/// Default character delta above which a change is "significant" and the
/// full snapshot is stored.
pub const DEFAULT_SIGNIFICANT_CHANGE_THRESHOLD: usize = 50;

/// Default character delta above which a session qualifies for a commit.
pub const DEFAULT_MIN_CHANGE_THRESHOLD: usize = 20;

/// Default percentage change above which a session qualifies for a commit.
pub const DEFAULT_MIN_CHANGE_PERCENTAGE: f32 = 10.0;

/// Default history capacity per note.
pub const DEFAULT_MAX_VERSIONS: usize = 50;

/// Tunable thresholds and intervals for change tracking.
///
/// All durations are milliseconds; all thresholds count Unicode scalar
/// values, not bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Debounce window for autosave.
    pub autosave_interval_ms: i64,
    /// Inactivity window after which an editing session ends.
    pub session_timeout_ms: i64,
    /// Sessions shorter than this never commit a version entry.
    pub min_session_duration_ms: i64,
    /// Character delta at which a diff is flagged significant.
    pub significant_change_threshold: usize,
    /// Character delta at which a session change qualifies for a commit.
    pub min_change_threshold: usize,
    /// Percentage change at which a session change qualifies for a commit.
    pub min_change_percentage: f32,
    /// Maximum version entries kept per note after pruning.
    pub max_versions: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            autosave_interval_ms: DEFAULT_AUTOSAVE_INTERVAL_MS,
            session_timeout_ms: DEFAULT_SESSION_TIMEOUT_MS,
            min_session_duration_ms: DEFAULT_MIN_SESSION_DURATION_MS,
            significant_change_threshold: DEFAULT_SIGNIFICANT_CHANGE_THRESHOLD,
            min_change_threshold: DEFAULT_MIN_CHANGE_THRESHOLD,
            min_change_percentage: DEFAULT_MIN_CHANGE_PERCENTAGE,
            max_versions: DEFAULT_MAX_VERSIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TrackerConfig;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = TrackerConfig::default();
        assert_eq!(cfg.autosave_interval_ms, 45_000);
        assert_eq!(cfg.session_timeout_ms, 180_000);
        assert_eq!(cfg.min_session_duration_ms, 30_000);
        assert_eq!(cfg.significant_change_threshold, 50);
        assert_eq!(cfg.min_change_threshold, 20);
        assert_eq!(cfg.min_change_percentage, 10.0);
        assert_eq!(cfg.max_versions, 50);
    }
}
