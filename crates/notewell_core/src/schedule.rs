//! Deterministic clock and delayed-task scheduling.
//!
//! # Responsibility
//! - Abstract "now" behind a trait so timing behavior is testable.
//! - Track per-note deadlines with explicit arm/cancel/fire semantics.
//!
//! # Invariants
//! - At most one live deadline per `(note, kind)` pair; re-arming replaces.
//! - The two timer families of one note are independent: cancelling one
//!   never cancels the other.
//! - `take_due` returns fired timers in deterministic order.

use crate::model::NoteId;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time in unix epoch milliseconds.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Wall-clock time source for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Settable time source for deterministic tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<i64>,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
        }
    }

    /// Moves the clock forward by `delta_ms`.
    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.get()
    }
}

impl<C: Clock> Clock for &C {
    fn now_ms(&self) -> i64 {
        (*self).now_ms()
    }
}

/// The two independent timer families tracked per note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimerKind {
    /// Debounced content persistence.
    Autosave,
    /// Inactivity window closing an editing session.
    SessionEnd,
}

/// Armed timer returned by `TimerQueue::take_due`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    pub note_id: NoteId,
    pub kind: TimerKind,
    pub deadline_ms: i64,
}

/// Per-note deadline registry with debounce semantics.
///
/// Deliberately passive: it never spawns threads or wakes itself. The owner
/// drives it by calling `take_due` with the current time, which keeps the
/// whole state machine single-threaded and simulation-friendly.
#[derive(Debug, Default)]
pub struct TimerQueue {
    deadlines: BTreeMap<(NoteId, TimerKind), i64>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms (or re-arms) the timer for `(note_id, kind)`.
    ///
    /// Replacing an existing deadline is the debounce primitive: the
    /// superseded deadline is gone before the new one exists, so two live
    /// timers for one pair can never coexist.
    pub fn arm(&mut self, note_id: NoteId, kind: TimerKind, deadline_ms: i64) {
        self.deadlines.insert((note_id, kind), deadline_ms);
    }

    /// Cancels one timer. No-op when nothing is armed.
    pub fn cancel(&mut self, note_id: NoteId, kind: TimerKind) {
        self.deadlines.remove(&(note_id, kind));
    }

    /// Cancels every timer for one note.
    pub fn cancel_note(&mut self, note_id: NoteId) {
        self.deadlines.remove(&(note_id, TimerKind::Autosave));
        self.deadlines.remove(&(note_id, TimerKind::SessionEnd));
    }

    /// Cancels everything.
    pub fn cancel_all(&mut self) {
        self.deadlines.clear();
    }

    /// Returns whether a timer is armed for `(note_id, kind)`.
    pub fn is_armed(&self, note_id: NoteId, kind: TimerKind) -> bool {
        self.deadlines.contains_key(&(note_id, kind))
    }

    /// Returns the earliest armed deadline, if any.
    pub fn next_deadline(&self) -> Option<i64> {
        self.deadlines.values().copied().min()
    }

    /// Removes and returns every timer due at or before `now_ms`.
    ///
    /// Order is deterministic: deadline first, then note id, then kind.
    pub fn take_due(&mut self, now_ms: i64) -> Vec<FiredTimer> {
        let mut due: Vec<FiredTimer> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now_ms)
            .map(|((note_id, kind), deadline)| FiredTimer {
                note_id: *note_id,
                kind: *kind,
                deadline_ms: *deadline,
            })
            .collect();
        due.sort_by_key(|timer| (timer.deadline_ms, timer.note_id, timer.kind));

        for timer in &due {
            self.deadlines.remove(&(timer.note_id, timer.kind));
        }
        due
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
