//! Lightweight text change estimation.
//!
//! # Responsibility
//! - Score how much one content string differs from another without a full
//!   edit-distance computation.
//!
//! # Invariants
//! - Pure and total over all string pairs; no errors possible.
//! - The heuristic may over-count changes, never under-count to zero for
//!   differing inputs.

/// Result of comparing two content strings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextDiffEstimate {
    /// Absolute length delta plus differing characters across the
    /// overlapping prefix.
    pub characters_changed: usize,
    /// `characters_changed` relative to the longer input, 0-100.
    pub change_percentage: f32,
    /// Whether `characters_changed` reached the given threshold.
    pub is_significant: bool,
}

/// Estimates the distance between two content strings.
///
/// The count is a cheap positional heuristic, not Levenshtein: characters
/// are compared pairwise over the shared prefix and the length difference is
/// added on top. An insertion near the front therefore scores as if most of
/// the text changed; over-reporting is acceptable for this use.
///
/// Total replacement (exactly one side empty) always scores 100%. Two empty
/// inputs score zero across the board.
pub fn estimate(old_text: &str, new_text: &str, significant_threshold: usize) -> TextDiffEstimate {
    let old_len = old_text.chars().count();
    let new_len = new_text.chars().count();
    let longest = old_len.max(new_len);

    if longest == 0 {
        return TextDiffEstimate {
            characters_changed: 0,
            change_percentage: 0.0,
            is_significant: significant_threshold == 0,
        };
    }

    let overlap_diff = old_text
        .chars()
        .zip(new_text.chars())
        .filter(|(old_char, new_char)| old_char != new_char)
        .count();
    let characters_changed = old_len.abs_diff(new_len) + overlap_diff;

    let change_percentage = if old_len == 0 || new_len == 0 {
        100.0
    } else {
        (characters_changed as f32 / longest as f32) * 100.0
    };

    TextDiffEstimate {
        characters_changed,
        change_percentage,
        is_significant: characters_changed >= significant_threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::estimate;

    #[test]
    fn identical_inputs_score_zero() {
        let est = estimate("same text", "same text", 50);
        assert_eq!(est.characters_changed, 0);
        assert_eq!(est.change_percentage, 0.0);
        assert!(!est.is_significant);
    }

    #[test]
    fn both_empty_scores_zero_percent() {
        let est = estimate("", "", 50);
        assert_eq!(est.characters_changed, 0);
        assert_eq!(est.change_percentage, 0.0);
    }

    #[test]
    fn total_replacement_scores_full_percentage() {
        let est = estimate("", "brand new body", 50);
        assert_eq!(est.characters_changed, 14);
        assert_eq!(est.change_percentage, 100.0);

        let wiped = estimate("previous body", "", 50);
        assert_eq!(wiped.change_percentage, 100.0);
    }

    #[test]
    fn append_counts_only_the_length_delta() {
        let est = estimate("Hello world", "Hello world!", 50);
        assert_eq!(est.characters_changed, 1);
        assert!(!est.is_significant);
    }

    #[test]
    fn prefix_insertion_over_counts_by_design() {
        // Shifting every character makes the positional compare see the
        // whole overlap as changed.
        let est = estimate("abcdef", "zabcdef", 3);
        assert_eq!(est.characters_changed, 1 + 6);
        assert!(est.is_significant);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let est = estimate("aaaa", "bbbb", 4);
        assert_eq!(est.characters_changed, 4);
        assert!(est.is_significant);
    }

    #[test]
    fn counts_unicode_scalars_not_bytes() {
        let est = estimate("héllo", "hello", 50);
        assert_eq!(est.characters_changed, 1);
    }
}
