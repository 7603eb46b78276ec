use notewell_core::{
    ChangeTracker, ManualClock, MemoryNoteStore, NewNote, NoteStore, TrackerConfig,
};
use uuid::Uuid;

fn seeded_store(content: &str) -> (MemoryNoteStore, i64, Uuid) {
    let store = MemoryNoteStore::new();
    let owner = Uuid::new_v4();
    let note_id = store
        .create(&NewNote {
            owner,
            title: "draft".to_string(),
            content: content.to_string(),
            history: Vec::new(),
        })
        .unwrap();
    (store, note_id, owner)
}

#[test]
fn debounce_many_changes_one_write_with_last_content() {
    let (store, note_id, owner) = seeded_store("A");
    let clock = ManualClock::new(0);
    let mut tracker = ChangeTracker::new(store.clone(), &clock, TrackerConfig::default());
    tracker.initialize(note_id, "A");
    let writes_before = store.write_count();

    for content in ["A1", "A12", "A123"] {
        clock.advance(1_000);
        tracker.record_change(note_id, content, owner);
        // Nothing is due inside the quiet window.
        assert_eq!(tracker.run_due(), 0);
    }

    clock.advance(45_000);
    assert!(tracker.run_due() >= 1);

    assert_eq!(store.write_count(), writes_before + 1);
    let note = store.get_one(note_id, owner).unwrap().unwrap();
    assert_eq!(note.content, "A123");
}

#[test]
fn quiet_autosave_persists_without_history() {
    let (store, note_id, owner) = seeded_store("A");
    let clock = ManualClock::new(0);
    let mut tracker = ChangeTracker::new(store.clone(), &clock, TrackerConfig::default());
    tracker.initialize(note_id, "A");

    tracker.record_change(note_id, "AB", owner);
    clock.advance(45_000);
    tracker.run_due();

    let note = store.get_one(note_id, owner).unwrap().unwrap();
    assert_eq!(note.content, "AB");
    assert!(note.history.is_empty());
}

#[test]
fn undo_back_to_saved_state_skips_the_write() {
    let (store, note_id, owner) = seeded_store("saved");
    let clock = ManualClock::new(0);
    let mut tracker = ChangeTracker::new(store.clone(), &clock, TrackerConfig::default());
    tracker.initialize(note_id, "saved");

    tracker.record_change(note_id, "saved!", owner);
    clock.advance(1_000);
    tracker.record_change(note_id, "saved", owner);
    let writes_before = store.write_count();

    clock.advance(45_000);
    tracker.run_due();
    assert_eq!(store.write_count(), writes_before);
}

#[test]
fn failed_autosave_keeps_pending_and_retries() {
    let (store, note_id, owner) = seeded_store("v1");
    let clock = ManualClock::new(0);
    let mut tracker = ChangeTracker::new(store.clone(), &clock, TrackerConfig::default());
    tracker.initialize(note_id, "v1");

    tracker.record_change(note_id, "v2", owner);
    store.set_fail_writes(true);
    clock.advance(45_000);
    tracker.run_due();
    assert_eq!(store.get_one(note_id, owner).unwrap().unwrap().content, "v1");

    // The re-armed timer is the retry.
    store.set_fail_writes(false);
    clock.advance(45_000);
    tracker.run_due();
    assert_eq!(store.get_one(note_id, owner).unwrap().unwrap().content, "v2");
}

#[test]
fn cleanup_flushes_differing_pending_content() {
    let (store, note_id, owner) = seeded_store("v1");
    let clock = ManualClock::new(0);
    let mut tracker = ChangeTracker::new(store.clone(), &clock, TrackerConfig::default());
    tracker.initialize(note_id, "v1");
    tracker.record_change(note_id, "v2 unsaved", owner);

    tracker.cleanup(note_id);
    assert!(!tracker.is_tracked(note_id));
    let note = store.get_one(note_id, owner).unwrap().unwrap();
    assert_eq!(note.content, "v2 unsaved");
    assert!(note.history.is_empty());

    // Timers are gone: advancing past the old deadlines fires nothing.
    clock.advance(400_000);
    assert_eq!(tracker.run_due(), 0);
}

#[test]
fn cleanup_swallows_flush_failure() {
    let (store, note_id, owner) = seeded_store("v1");
    let clock = ManualClock::new(0);
    let mut tracker = ChangeTracker::new(store.clone(), &clock, TrackerConfig::default());
    tracker.initialize(note_id, "v1");
    tracker.record_change(note_id, "v2", owner);

    store.set_fail_writes(true);
    tracker.cleanup(note_id);
    assert!(!tracker.is_tracked(note_id));
    store.set_fail_writes(false);
    assert_eq!(store.get_one(note_id, owner).unwrap().unwrap().content, "v1");
}

#[test]
fn cleanup_all_flushes_every_tracked_note() {
    let store = MemoryNoteStore::new();
    let owner = Uuid::new_v4();
    let first = store
        .create(&NewNote {
            owner,
            title: "one".to_string(),
            content: "1".to_string(),
            history: Vec::new(),
        })
        .unwrap();
    let second = store
        .create(&NewNote {
            owner,
            title: "two".to_string(),
            content: "2".to_string(),
            history: Vec::new(),
        })
        .unwrap();

    let clock = ManualClock::new(0);
    let mut tracker = ChangeTracker::new(store.clone(), &clock, TrackerConfig::default());
    tracker.initialize(first, "1");
    tracker.initialize(second, "2");
    tracker.record_change(first, "1 edited", owner);
    tracker.record_change(second, "2 edited", owner);

    tracker.cleanup_all();
    assert_eq!(store.get_one(first, owner).unwrap().unwrap().content, "1 edited");
    assert_eq!(store.get_one(second, owner).unwrap().unwrap().content, "2 edited");
    assert!(tracker.next_deadline_ms().is_none());
}
