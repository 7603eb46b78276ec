//! Note storage capability.
//!
//! # Responsibility
//! - Define the one interface the core uses to reach either backend.
//! - Keep the core oblivious to how a note is actually stored.
//!
//! # Invariants
//! - History replacement goes through `update_fields`; there is no append
//!   primitive. Callers read, prune and write the full array.
//! - Per call, a store provides at least read-your-writes consistency.

use crate::db::DbError;
use crate::model::{NewNote, Note, NoteFieldPatch, NoteId, OwnerId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryNoteStore;
pub use sqlite::SqliteNoteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage failure surfaced through the `NoteStore` capability.
#[derive(Debug)]
pub enum StoreError {
    NotFound(NoteId),
    Db(DbError),
    InvalidData(String),
    /// Backend temporarily refused the operation (network, lock, injection
    /// in tests). Retryable.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Capability contract over a note backend.
///
/// Two interchangeable implementations exist: the single-owner local store
/// and the multi-owner cloud store. The core is written once against this
/// trait and never learns which one is active.
pub trait NoteStore {
    /// Creates a note; the store assigns and returns the id.
    fn create(&self, note: &NewNote) -> StoreResult<NoteId>;

    /// Returns every note belonging to `owner`.
    fn get(&self, owner: OwnerId) -> StoreResult<Vec<Note>>;

    /// Returns one note by id, scoped to `owner`.
    fn get_one(&self, note_id: NoteId, owner: OwnerId) -> StoreResult<Option<Note>>;

    /// Replaces a note's content.
    fn update_content(&self, note_id: NoteId, content: &str) -> StoreResult<()>;

    /// Applies a partial update (title, content and/or history replacement).
    fn update_fields(&self, note_id: NoteId, patch: &NoteFieldPatch) -> StoreResult<()>;
}

impl<S: NoteStore> NoteStore for &S {
    fn create(&self, note: &NewNote) -> StoreResult<NoteId> {
        (*self).create(note)
    }

    fn get(&self, owner: OwnerId) -> StoreResult<Vec<Note>> {
        (*self).get(owner)
    }

    fn get_one(&self, note_id: NoteId, owner: OwnerId) -> StoreResult<Option<Note>> {
        (*self).get_one(note_id, owner)
    }

    fn update_content(&self, note_id: NoteId, content: &str) -> StoreResult<()> {
        (*self).update_content(note_id, content)
    }

    fn update_fields(&self, note_id: NoteId, patch: &NoteFieldPatch) -> StoreResult<()> {
        (*self).update_fields(note_id, patch)
    }
}
