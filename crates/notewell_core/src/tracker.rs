//! Per-note autosave and history tracking.
//!
//! # Responsibility
//! - Debounce content edits into durable autosaves.
//! - Bound editing activity into sessions and commit at most one version
//!   entry per session.
//! - Flush pending edits when a note stops being tracked.
//!
//! # Invariants
//! - A note has at most one tracking state and at most one live session.
//! - Autosave never appends a version entry; it exists for crash safety.
//! - Cleanup cancels a note's timers synchronously and never errors.
//!
//! # See also
//! - docs/architecture/change-tracking.md

use crate::config::TrackerConfig;
use crate::history;
use crate::model::{is_valid_note_id, EditKind, NoteFieldPatch, NoteId, OwnerId, VersionEntry};
use crate::schedule::{Clock, TimerKind, TimerQueue};
use crate::store::{NoteStore, StoreError, StoreResult};
use log::{debug, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Two explicit saves of kind `update` closer together than this window
/// coalesce into one version entry.
pub const FORCE_SAVE_COALESCE_WINDOW_MS: i64 = 60_000;

/// Tracking failure surfaced by explicit tracker operations.
#[derive(Debug)]
pub enum TrackerError {
    /// Sentinel or non-positive note id.
    InvalidNoteId(NoteId),
    /// Empty content on an explicit `update` save; rejected as a guard
    /// against accidental wipes.
    EmptyContent(NoteId),
    NoteNotFound(NoteId),
    Store(StoreError),
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNoteId(id) => write!(f, "invalid note id: {id}"),
            Self::EmptyContent(id) => write!(f, "refusing empty update save for note {id}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TrackerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for TrackerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NoteNotFound(id),
            other => Self::Store(other),
        }
    }
}

/// One bounded span of continuous editing on a note.
#[derive(Debug, Clone)]
struct EditingSession {
    started_at_ms: i64,
    /// Content the note had when the session began; the whole session is
    /// measured against this, not against intermediate keystrokes.
    start_content: String,
    last_activity_ms: i64,
    /// Sticky: once true, later small edits cannot un-flag the session.
    has_significant_changes: bool,
}

/// Working memory for one tracked note. Never persisted.
#[derive(Debug)]
struct TrackingState {
    last_persisted_content: String,
    pending_content: Option<String>,
    owner: Option<OwnerId>,
    session: Option<EditingSession>,
}

impl TrackingState {
    fn seeded(content: &str) -> Self {
        Self {
            last_persisted_content: content.to_string(),
            pending_content: None,
            owner: None,
            session: None,
        }
    }
}

/// The per-note change-tracking engine.
///
/// All operations run on one logical thread; deferred work fires only when
/// the host pumps `run_due`, so behavior is deterministic under a
/// `ManualClock`.
pub struct ChangeTracker<S: NoteStore, C: Clock> {
    store: S,
    clock: C,
    config: TrackerConfig,
    states: HashMap<NoteId, TrackingState>,
    timers: TimerQueue,
}

impl<S: NoteStore, C: Clock> ChangeTracker<S, C> {
    pub fn new(store: S, clock: C, config: TrackerConfig) -> Self {
        Self {
            store,
            clock,
            config,
            states: HashMap::new(),
            timers: TimerQueue::new(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Replaces the configuration.
    ///
    /// Timers already armed keep their deadlines; the new values apply the
    /// next time a timer is armed.
    pub fn update_config(&mut self, config: TrackerConfig) {
        self.config = config;
    }

    /// Earliest armed deadline, for hosts that want to sleep until then.
    pub fn next_deadline_ms(&self) -> Option<i64> {
        self.timers.next_deadline()
    }

    /// Seeds the persisted-content baseline for a note.
    ///
    /// Idempotent: re-initializing an already tracked note resets the
    /// baseline and discards pending state and timers.
    pub fn initialize(&mut self, note_id: NoteId, current_content: &str) {
        if !is_valid_note_id(note_id) {
            warn!("event=initialize module=tracker status=rejected reason=invalid_note_id note_id={note_id}");
            return;
        }
        self.timers.cancel_note(note_id);
        self.states
            .insert(note_id, TrackingState::seeded(current_content));
        debug!("event=initialize module=tracker status=ok note_id={note_id}");
    }

    /// Records a content edit for a note.
    ///
    /// Invalid ids are logged and ignored. The first change ever observed
    /// for an untracked note only seeds the baseline, so opening a note
    /// never triggers a spurious autosave. Subsequent changes debounce the
    /// autosave timer and start or extend the editing session.
    pub fn record_change(&mut self, note_id: NoteId, new_content: &str, owner: OwnerId) {
        if !is_valid_note_id(note_id) {
            warn!("event=record_change module=tracker status=rejected reason=invalid_note_id note_id={note_id}");
            return;
        }

        let now_ms = self.clock.now_ms();
        let Some(state) = self.states.get_mut(&note_id) else {
            let mut state = TrackingState::seeded(new_content);
            state.owner = Some(owner);
            self.states.insert(note_id, state);
            debug!("event=record_change module=tracker status=seeded note_id={note_id}");
            return;
        };
        state.owner = Some(owner);

        // Debounced autosave: only the last change within the window is
        // ever persisted.
        state.pending_content = Some(new_content.to_string());
        self.timers.arm(
            note_id,
            TimerKind::Autosave,
            now_ms + self.config.autosave_interval_ms,
        );

        match &mut state.session {
            Some(session) => {
                session.last_activity_ms = now_ms;
                if !session.has_significant_changes
                    && history::should_commit(&session.start_content, new_content, &self.config)
                {
                    session.has_significant_changes = true;
                }
            }
            None => {
                let start_content = state.last_persisted_content.clone();
                let has_significant_changes =
                    history::should_commit(&start_content, new_content, &self.config);
                state.session = Some(EditingSession {
                    started_at_ms: now_ms,
                    start_content,
                    last_activity_ms: now_ms,
                    has_significant_changes,
                });
            }
        }
        self.timers.arm(
            note_id,
            TimerKind::SessionEnd,
            now_ms + self.config.session_timeout_ms,
        );
    }

    /// Fires every timer due at the injected clock's current time.
    ///
    /// Returns the number of timers fired.
    pub fn run_due(&mut self) -> usize {
        let now_ms = self.clock.now_ms();
        let due = self.timers.take_due(now_ms);
        let fired = due.len();
        for timer in due {
            match timer.kind {
                TimerKind::Autosave => self.fire_autosave(timer.note_id, now_ms),
                TimerKind::SessionEnd => self.fire_session_end(timer.note_id, now_ms),
            }
        }
        fired
    }

    /// Persists content and history immediately, bypassing both timers.
    ///
    /// Used for explicit-save triggers: interactive saves and title, tag or
    /// category changes. Rapid `update` saves inside the one-minute
    /// coalescing window update content without a second version entry.
    ///
    /// # Errors
    /// - `InvalidNoteId` for sentinel ids.
    /// - `EmptyContent` for an empty `update` save.
    /// - `NoteNotFound` / `Store` when persistence fails; explicit saves
    ///   surface store errors instead of swallowing them.
    pub fn force_save(
        &mut self,
        note_id: NoteId,
        content: &str,
        edit_kind: EditKind,
        owner: OwnerId,
    ) -> Result<(), TrackerError> {
        if !is_valid_note_id(note_id) {
            return Err(TrackerError::InvalidNoteId(note_id));
        }
        if content.is_empty() && edit_kind == EditKind::Update {
            return Err(TrackerError::EmptyContent(note_id));
        }

        let now_ms = self.clock.now_ms();
        let note = self
            .store
            .get_one(note_id, owner)?
            .ok_or(TrackerError::NoteNotFound(note_id))?;
        let previous_content = note.content;

        self.store.update_content(note_id, content)?;

        let newest_entry_ms = note
            .history
            .iter()
            .map(|entry| entry.timestamp_ms)
            .max()
            .unwrap_or(i64::MIN);
        let coalesce = edit_kind == EditKind::Update
            && now_ms.saturating_sub(newest_entry_ms) < FORCE_SAVE_COALESCE_WINDOW_MS;

        if coalesce {
            debug!(
                "event=force_save module=tracker status=coalesced note_id={note_id} kind={}",
                edit_kind.as_str()
            );
        } else {
            let mut history = note.history;
            history.push(history::build_entry(
                &previous_content,
                content,
                edit_kind,
                now_ms,
                &self.config,
            ));
            history::prune(&mut history, self.config.max_versions);
            self.store
                .update_fields(note_id, &NoteFieldPatch::history_only(history))?;
            debug!(
                "event=force_save module=tracker status=ok note_id={note_id} kind={}",
                edit_kind.as_str()
            );
        }

        // The explicit save supersedes any pending autosave.
        if let Some(state) = self.states.get_mut(&note_id) {
            state.last_persisted_content = content.to_string();
            state.pending_content = None;
            state.owner = Some(owner);
        }
        self.timers.cancel(note_id, TimerKind::Autosave);

        Ok(())
    }

    /// Returns a note's version history, newest first.
    pub fn history(&self, note_id: NoteId, owner: OwnerId) -> Result<Vec<VersionEntry>, TrackerError> {
        if !is_valid_note_id(note_id) {
            return Err(TrackerError::InvalidNoteId(note_id));
        }
        let note = self
            .store
            .get_one(note_id, owner)?
            .ok_or(TrackerError::NoteNotFound(note_id))?;
        Ok(note.history)
    }

    /// Stops tracking one note.
    ///
    /// Cancels both timer families synchronously, best-effort flushes any
    /// pending content that differs from the baseline, and discards state.
    /// Runs on navigation/unmount paths, so it never errors; a failed flush
    /// is logged and swallowed.
    pub fn cleanup(&mut self, note_id: NoteId) {
        self.timers.cancel_note(note_id);
        let Some(state) = self.states.remove(&note_id) else {
            return;
        };
        if let Some(pending) = state.pending_content {
            if pending != state.last_persisted_content {
                if let Err(err) = self.store.update_content(note_id, &pending) {
                    warn!(
                        "event=cleanup_flush module=tracker status=error note_id={note_id} error={err}"
                    );
                }
            }
        }
        debug!("event=cleanup module=tracker status=ok note_id={note_id}");
    }

    /// Stops tracking every note. Shutdown path.
    pub fn cleanup_all(&mut self) {
        let note_ids: Vec<NoteId> = self.states.keys().copied().collect();
        for note_id in note_ids {
            self.cleanup(note_id);
        }
        self.timers.cancel_all();
    }

    /// Whether a note currently has tracking state.
    pub fn is_tracked(&self, note_id: NoteId) -> bool {
        self.states.contains_key(&note_id)
    }

    /// Whether a note currently has a live editing session.
    pub fn has_active_session(&self, note_id: NoteId) -> bool {
        self.states
            .get(&note_id)
            .is_some_and(|state| state.session.is_some())
    }

    fn fire_autosave(&mut self, note_id: NoteId, now_ms: i64) {
        let Some(state) = self.states.get_mut(&note_id) else {
            return;
        };
        let Some(pending) = state.pending_content.as_deref() else {
            return;
        };
        if pending == state.last_persisted_content {
            // User undid back to the saved state; nothing to persist.
            state.pending_content = None;
            return;
        }

        match self.store.update_content(note_id, pending) {
            Ok(()) => {
                state.last_persisted_content =
                    state.pending_content.take().unwrap_or_default();
                debug!("event=autosave module=tracker status=ok note_id={note_id}");
            }
            Err(err) => {
                // Pending content stays in place; the re-armed timer is the
                // retry. Autosave is best-effort, so no error escapes.
                warn!("event=autosave module=tracker status=error note_id={note_id} error={err}");
                self.timers.arm(
                    note_id,
                    TimerKind::Autosave,
                    now_ms + self.config.autosave_interval_ms,
                );
            }
        }
    }

    fn fire_session_end(&mut self, note_id: NoteId, now_ms: i64) {
        let Some(state) = self.states.get_mut(&note_id) else {
            return;
        };
        let Some(session) = state.session.take() else {
            return;
        };

        let final_content = state
            .pending_content
            .clone()
            .unwrap_or_else(|| state.last_persisted_content.clone());
        let qualifies = now_ms - session.started_at_ms >= self.config.min_session_duration_ms
            && session.has_significant_changes
            && final_content != session.start_content;
        if !qualifies {
            debug!("event=session_end module=tracker status=skipped note_id={note_id}");
            return;
        }

        let owner = state.owner;
        let result = self.commit_session_entry(
            note_id,
            owner,
            &session.start_content,
            &final_content,
            now_ms,
        );
        match result {
            Ok(()) => {
                debug!("event=session_end module=tracker status=committed note_id={note_id}")
            }
            // Session state is already discarded; a failed commit only
            // loses this session's history entry, never content.
            Err(err) => warn!(
                "event=session_end module=tracker status=error note_id={note_id} error={err}"
            ),
        }
    }

    fn commit_session_entry(
        &self,
        note_id: NoteId,
        owner: Option<OwnerId>,
        start_content: &str,
        final_content: &str,
        now_ms: i64,
    ) -> StoreResult<()> {
        let Some(owner) = owner else {
            return Err(StoreError::InvalidData(format!(
                "no owner recorded for tracked note {note_id}"
            )));
        };
        let note = self
            .store
            .get_one(note_id, owner)?
            .ok_or(StoreError::NotFound(note_id))?;

        let mut history = note.history;
        history.push(history::build_entry(
            start_content,
            final_content,
            EditKind::Update,
            now_ms,
            &self.config,
        ));
        history::prune(&mut history, self.config.max_versions);
        self.store
            .update_fields(note_id, &NoteFieldPatch::history_only(history))
    }
}
