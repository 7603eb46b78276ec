//! In-memory note store.
//!
//! # Responsibility
//! - Provide a `NoteStore` backend with no I/O, used as the cloud stand-in
//!   (the transport behind the real cloud backend is out of scope) and as
//!   the workhorse for tracker/resolver tests.
//!
//! # Invariants
//! - Cloned handles share one underlying note map.
//! - Assigned ids are monotonically increasing and never reused.

use crate::model::{NewNote, Note, NoteFieldPatch, NoteId, OwnerId};
use crate::store::{NoteStore, StoreError, StoreResult};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Default)]
struct Inner {
    notes: BTreeMap<NoteId, Note>,
    next_id: NoteId,
    fail_writes: bool,
    write_count: u64,
}

/// Shared-handle in-memory store.
///
/// Not `Send`: the core's concurrency model is single-threaded cooperative
/// scheduling, so a `Rc<RefCell<..>>` handle is all the sharing needed.
#[derive(Debug, Clone, Default)]
pub struct MemoryNoteStore {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with `StoreError::Unavailable`.
    ///
    /// Test hook for transient-failure paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> u64 {
        self.inner.borrow().write_count
    }

    fn check_writable(inner: &Inner) -> StoreResult<()> {
        if inner.fail_writes {
            return Err(StoreError::Unavailable("write failure injected".into()));
        }
        Ok(())
    }

    fn now_ms() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or(0)
    }
}

impl NoteStore for MemoryNoteStore {
    fn create(&self, note: &NewNote) -> StoreResult<NoteId> {
        let mut inner = self.inner.borrow_mut();
        Self::check_writable(&inner)?;

        inner.next_id += 1;
        let id = inner.next_id;
        let now_ms = Self::now_ms();
        inner.notes.insert(
            id,
            Note {
                id,
                owner: note.owner,
                title: note.title.clone(),
                content: note.content.clone(),
                created_at_ms: now_ms,
                updated_at_ms: now_ms,
                history: note.history.clone(),
            },
        );
        inner.write_count += 1;
        Ok(id)
    }

    fn get(&self, owner: OwnerId) -> StoreResult<Vec<Note>> {
        Ok(self
            .inner
            .borrow()
            .notes
            .values()
            .filter(|note| note.owner == owner)
            .cloned()
            .collect())
    }

    fn get_one(&self, note_id: NoteId, owner: OwnerId) -> StoreResult<Option<Note>> {
        Ok(self
            .inner
            .borrow()
            .notes
            .get(&note_id)
            .filter(|note| note.owner == owner)
            .cloned())
    }

    fn update_content(&self, note_id: NoteId, content: &str) -> StoreResult<()> {
        let mut inner = self.inner.borrow_mut();
        Self::check_writable(&inner)?;

        let note = inner
            .notes
            .get_mut(&note_id)
            .ok_or(StoreError::NotFound(note_id))?;
        note.content = content.to_string();
        note.updated_at_ms = Self::now_ms();
        inner.write_count += 1;
        Ok(())
    }

    fn update_fields(&self, note_id: NoteId, patch: &NoteFieldPatch) -> StoreResult<()> {
        let mut inner = self.inner.borrow_mut();
        Self::check_writable(&inner)?;

        let note = inner
            .notes
            .get_mut(&note_id)
            .ok_or(StoreError::NotFound(note_id))?;
        if let Some(title) = &patch.title {
            note.title = title.clone();
        }
        if let Some(content) = &patch.content {
            note.content = content.clone();
        }
        if let Some(history) = &patch.history {
            note.history = history.clone();
        }
        note.updated_at_ms = Self::now_ms();
        inner.write_count += 1;
        Ok(())
    }
}
