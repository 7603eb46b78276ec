//! Note domain model.
//!
//! # Responsibility
//! - Define the note record the core tracks and reconciles.
//! - Define immutable version-history entries and store-facing payloads.
//!
//! # Invariants
//! - `id` is stable and unique per owner; values `<= 0` are sentinels.
//! - A `VersionEntry` is never mutated after creation.
//! - A pruned history never exceeds the configured `max_versions` bound.
//!
//! # See also
//! - docs/architecture/data-model.md

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable integer identity assigned by a store, unique per owner.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
/// Non-positive values are sentinels and must be rejected by tracking APIs.
pub type NoteId = i64;

/// Owner identity shared by both store backends.
pub type OwnerId = Uuid;

/// Kind of edit that produced a version entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    /// Note creation.
    Create,
    /// Content replacement from an editing session or explicit save.
    Update,
    /// Title change.
    Title,
    /// Tag set change.
    Tags,
    /// Category change.
    Category,
    /// Debounced background save. Never appears in stored history.
    Autosave,
}

impl EditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Title => "title",
            Self::Tags => "tags",
            Self::Category => "category",
            Self::Autosave => "autosave",
        }
    }
}

/// Immutable record of a note's content at a point judged worth keeping.
///
/// `content_snapshot` is omitted when the change crossed the commit threshold
/// without being significant, so trivial-but-committed edits still leave an
/// audit row without growing storage by the full text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Unix epoch milliseconds at commit time.
    pub timestamp_ms: i64,
    /// What kind of edit produced this entry.
    pub edit_kind: EditKind,
    /// Full text at commit time, present only for significant changes.
    pub content_snapshot: Option<String>,
    /// Character length of the content at commit time.
    pub content_length: usize,
    /// Estimated percentage changed relative to the previous content, 0-100.
    pub change_percentage: f32,
}

/// Note record as seen through the `NoteStore` capability.
///
/// The core only ever mutates `content` and `history`; everything else is
/// owned by the store backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub owner: OwnerId,
    pub title: String,
    pub content: String,
    /// Unix epoch milliseconds.
    pub created_at_ms: i64,
    /// Unix epoch milliseconds.
    pub updated_at_ms: i64,
    /// Version entries, newest first once pruned.
    pub history: Vec<VersionEntry>,
}

/// Creation payload for stores that assign their own ids.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNote {
    pub owner: OwnerId,
    pub title: String,
    pub content: String,
    pub history: Vec<VersionEntry>,
}

impl NewNote {
    /// Builds a creation payload carrying an existing note's user-visible
    /// fields, used when copying a note from one store into the other.
    pub fn from_note(note: &Note) -> Self {
        Self {
            owner: note.owner,
            title: note.title.clone(),
            content: note.content.clone(),
            history: note.history.clone(),
        }
    }
}

/// Partial update payload for `NoteStore::update_fields`.
///
/// `None` fields are left untouched by the store. History replacement is the
/// only way to append entries: callers read, prune and write the full array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteFieldPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub history: Option<Vec<VersionEntry>>,
}

impl NoteFieldPatch {
    /// Returns a patch that only replaces the history array.
    pub fn history_only(history: Vec<VersionEntry>) -> Self {
        Self {
            history: Some(history),
            ..Self::default()
        }
    }

    /// Returns whether the patch carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.history.is_none()
    }
}

/// Returns whether a note id is a usable identity.
pub fn is_valid_note_id(id: NoteId) -> bool {
    id > 0
}
