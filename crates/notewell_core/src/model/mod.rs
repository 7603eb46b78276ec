//! Domain model for the change-tracking core.

pub mod note;

pub use note::{
    is_valid_note_id, EditKind, NewNote, Note, NoteFieldPatch, NoteId, OwnerId, VersionEntry,
};
