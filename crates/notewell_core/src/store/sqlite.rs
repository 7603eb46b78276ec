//! SQLite-backed local note store.
//!
//! # Responsibility
//! - Implement the `NoteStore` capability over the local database.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - History arrays round-trip through the `history_json` column unchanged.
//! - Invalid persisted rows are rejected as `InvalidData`, never masked.

use crate::model::{NewNote, Note, NoteFieldPatch, NoteId, OwnerId, VersionEntry};
use crate::store::{NoteStore, StoreError, StoreResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    owner_uuid,
    title,
    content,
    history_json,
    created_at,
    updated_at
FROM notes";

/// Local `NoteStore` adapter over a bootstrapped connection.
///
/// The connection must come from `db::open_db`/`db::open_db_in_memory` so
/// migrations are already applied.
pub struct SqliteNoteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NoteStore for SqliteNoteStore<'_> {
    fn create(&self, note: &NewNote) -> StoreResult<NoteId> {
        let history_json = encode_history(&note.history)?;
        self.conn.execute(
            "INSERT INTO notes (owner_uuid, title, content, history_json)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                note.owner.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                history_json,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get(&self, owner: OwnerId) -> StoreResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL} WHERE owner_uuid = ?1 ORDER BY updated_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query(params![owner.to_string()])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn get_one(&self, note_id: NoteId, owner: OwnerId) -> StoreResult<Option<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL} WHERE id = ?1 AND owner_uuid = ?2;"
        ))?;
        let mut rows = stmt.query(params![note_id, owner.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn update_content(&self, note_id: NoteId, content: &str) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET content = ?1, updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![content, note_id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(note_id));
        }
        Ok(())
    }

    fn update_fields(&self, note_id: NoteId, patch: &NoteFieldPatch) -> StoreResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut assignments = vec!["updated_at = (strftime('%s', 'now') * 1000)".to_string()];
        let mut values: Vec<rusqlite::types::Value> = Vec::new();
        if let Some(title) = &patch.title {
            values.push(title.clone().into());
            assignments.push(format!("title = ?{}", values.len()));
        }
        if let Some(content) = &patch.content {
            values.push(content.clone().into());
            assignments.push(format!("content = ?{}", values.len()));
        }
        if let Some(history) = &patch.history {
            values.push(encode_history(history)?.into());
            assignments.push(format!("history_json = ?{}", values.len()));
        }
        values.push(note_id.into());
        let sql = format!(
            "UPDATE notes SET {} WHERE id = ?{};",
            assignments.join(", "),
            values.len()
        );

        let changed = self
            .conn
            .execute(&sql, rusqlite::params_from_iter(values))?;
        if changed == 0 {
            return Err(StoreError::NotFound(note_id));
        }
        Ok(())
    }
}

fn encode_history(history: &[VersionEntry]) -> StoreResult<String> {
    serde_json::to_string(history)
        .map_err(|err| StoreError::InvalidData(format!("unencodable history: {err}")))
}

fn parse_note_row(row: &Row<'_>) -> StoreResult<Note> {
    let owner_text: String = row.get("owner_uuid")?;
    let owner = Uuid::parse_str(&owner_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid `{owner_text}` in notes.owner_uuid"))
    })?;

    let history_json: String = row.get("history_json")?;
    let history: Vec<VersionEntry> = serde_json::from_str(&history_json).map_err(|err| {
        StoreError::InvalidData(format!("invalid history_json in notes row: {err}"))
    })?;

    Ok(Note {
        id: row.get("id")?,
        owner,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at_ms: row.get("created_at")?,
        updated_at_ms: row.get("updated_at")?,
        history,
    })
}
