use notewell_core::{
    ChangeTracker, EditKind, ManualClock, MemoryNoteStore, NewNote, NoteStore, TrackerConfig,
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
fn trivial_edit_never_reaches_history() {
    let (store, note_id, owner) = seeded_store("Hello world");
    let clock = ManualClock::new(0);
    let mut tracker = ChangeTracker::new(store.clone(), &clock, TrackerConfig::default());
    tracker.initialize(note_id, "Hello world");

    tracker.record_change(note_id, "Hello world!", owner);
    clock.advance(180_000);
    tracker.run_due();

    assert!(tracker.history(note_id, owner).unwrap().is_empty());
    // The edit itself was still autosaved.
    assert_eq!(
        store.get_one(note_id, owner).unwrap().unwrap().content,
        "Hello world!"
    );
}

#[test]
fn significant_session_commits_exactly_one_entry() {
    let (store, note_id, owner) = seeded_store("");
    let clock = ManualClock::new(0);
    let mut tracker = ChangeTracker::new(store.clone(), &clock, TrackerConfig::default());
    tracker.initialize(note_id, "");

    let body = "x".repeat(80);
    tracker.record_change(note_id, &body, owner);
    clock.advance(180_000);
    tracker.run_due();

    let history = tracker.history(note_id, owner).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].edit_kind, EditKind::Update);
    assert_eq!(history[0].content_snapshot.as_deref(), Some(body.as_str()));
    assert!(!tracker.has_active_session(note_id));
}

#[test]
fn session_shorter_than_minimum_duration_never_commits() {
    let (store, note_id, owner) = seeded_store("");
    let clock = ManualClock::new(0);
    let cfg = TrackerConfig {
        session_timeout_ms: 10_000,
        min_session_duration_ms: 30_000,
        ..TrackerConfig::default()
    };
    let mut tracker = ChangeTracker::new(store.clone(), &clock, cfg);
    tracker.initialize(note_id, "");

    tracker.record_change(note_id, &"y".repeat(200), owner);
    clock.advance(10_000);
    tracker.run_due();

    assert!(tracker.history(note_id, owner).unwrap().is_empty());
}

#[test]
fn significance_flag_is_sticky_for_the_session() {
    let (store, note_id, owner) = seeded_store("base");
    let clock = ManualClock::new(0);
    let mut tracker = ChangeTracker::new(store.clone(), &clock, TrackerConfig::default());
    tracker.initialize(note_id, "base");

    // A large intermediate paste flags the session...
    tracker.record_change(note_id, &format!("base {}", "z".repeat(100)), owner);
    clock.advance(60_000);
    // ...and a later revert to a small net delta cannot un-flag it.
    tracker.record_change(note_id, "base +", owner);
    clock.advance(180_000);
    tracker.run_due();

    let history = tracker.history(note_id, owner).unwrap();
    assert_eq!(history.len(), 1);
    // Net change is below the significance threshold, so the entry keeps
    // audit metadata without a snapshot.
    assert!(history[0].content_snapshot.is_none());
    assert!(history[0].content_length > 0);
}

#[test]
fn repeated_changes_extend_one_session_instead_of_duplicating() {
    let (store, note_id, owner) = seeded_store("");
    let clock = ManualClock::new(0);
    let mut tracker = ChangeTracker::new(store.clone(), &clock, TrackerConfig::default());
    tracker.initialize(note_id, "");

    for i in 0..5 {
        tracker.record_change(note_id, &"w".repeat(30 + i), owner);
        clock.advance(60_000);
        tracker.run_due();
    }
    assert!(tracker.has_active_session(note_id));

    clock.advance(180_000);
    tracker.run_due();
    assert_eq!(tracker.history(note_id, owner).unwrap().len(), 1);
}

#[test]
fn force_saves_inside_the_window_coalesce() {
    let (store, note_id, owner) = seeded_store("v1");
    let clock = ManualClock::new(1_000_000);
    let mut tracker = ChangeTracker::new(store.clone(), &clock, TrackerConfig::default());

    tracker
        .force_save(note_id, "v2", EditKind::Update, owner)
        .unwrap();
    clock.advance(30_000);
    tracker
        .force_save(note_id, "v3", EditKind::Update, owner)
        .unwrap();

    let history = tracker.history(note_id, owner).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(
        store.get_one(note_id, owner).unwrap().unwrap().content,
        "v3"
    );

    // Outside the window a second entry is recorded.
    clock.advance(61_000);
    tracker
        .force_save(note_id, "v4", EditKind::Update, owner)
        .unwrap();
    assert_eq!(tracker.history(note_id, owner).unwrap().len(), 2);
}

#[test]
fn non_update_kinds_never_coalesce() {
    let (store, note_id, owner) = seeded_store("v1");
    let clock = ManualClock::new(1_000_000);
    let mut tracker = ChangeTracker::new(store, &clock, TrackerConfig::default());

    tracker
        .force_save(note_id, "v2", EditKind::Update, owner)
        .unwrap();
    clock.advance(5_000);
    tracker
        .force_save(note_id, "v2", EditKind::Title, owner)
        .unwrap();

    assert_eq!(tracker.history(note_id, owner).unwrap().len(), 2);
}

#[test]
fn force_save_cancels_the_pending_autosave() {
    let (store, note_id, owner) = seeded_store("v1");
    let clock = ManualClock::new(0);
    let mut tracker = ChangeTracker::new(store.clone(), &clock, TrackerConfig::default());
    tracker.initialize(note_id, "v1");

    tracker.record_change(note_id, "typed", owner);
    tracker
        .force_save(note_id, "typed", EditKind::Update, owner)
        .unwrap();
    let writes_before = store.write_count();

    clock.advance(45_000);
    tracker.run_due();
    // No superseded autosave fired after the explicit save.
    assert_eq!(store.write_count(), writes_before);
}

#[test]
fn history_is_pruned_to_capacity_newest_first() {
    let (store, note_id, owner) = seeded_store("v0");
    let clock = ManualClock::new(1_000_000);
    let cfg = TrackerConfig {
        max_versions: 3,
        ..TrackerConfig::default()
    };
    let mut tracker = ChangeTracker::new(store, &clock, cfg);

    for i in 1..=5 {
        tracker
            .force_save(note_id, &format!("v{i}"), EditKind::Update, owner)
            .unwrap();
        clock.advance(61_000);
    }

    let history = tracker.history(note_id, owner).unwrap();
    assert_eq!(history.len(), 3);
    let stamps: Vec<i64> = history.iter().map(|e| e.timestamp_ms).collect();
    let mut sorted = stamps.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(stamps, sorted);
    // The three newest saves survive.
    assert_eq!(stamps[0], 1_000_000 + 4 * 61_000);
}
