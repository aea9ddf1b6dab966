//! One behavioral suite run against both storage backends; the two
//! hosting modes must honor the store contract identically.

use questlog_core::db::open_db_in_memory;
use questlog_core::{
    GoalPatch, GoalStatus, JournalStore, LocalJournalStore, SqliteJournalStore, StoreError,
    SubtaskPatch, ValidationError, DEFAULT_COLOR,
};

#[test]
fn sqlite_backend_honors_the_contract() {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteJournalStore::try_new(&mut conn).unwrap();
    exercise_contract(&mut store);
}

#[test]
fn local_backend_honors_the_contract() {
    let mut store = LocalJournalStore::in_memory();
    exercise_contract(&mut store);
}

fn exercise_contract(store: &mut impl JournalStore) {
    notes_are_listed_newest_first(store);
    note_delete_is_idempotent(store);
    goal_defaults_and_patching(store);
    subtasks_inherit_goal_color(store);
    goal_delete_cascades(store);
    unknown_goal_is_rejected(store);
    stats_singleton_exists(store);
}

fn notes_are_listed_newest_first(store: &mut impl JournalStore) {
    let first = store.create_note("Met a dragon").unwrap();
    let second = store.create_note("Slew the dragon").unwrap();

    let notes = store.list_notes().unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].id, second.id);
    assert_eq!(notes[1].id, first.id);
    assert!(notes[0].created_at >= notes[1].created_at);

    store.delete_note(first.id).unwrap();
    store.delete_note(second.id).unwrap();
}

fn note_delete_is_idempotent(store: &mut impl JournalStore) {
    let note = store.create_note("ephemeral").unwrap();
    store.delete_note(note.id).unwrap();
    store.delete_note(note.id).unwrap();
    assert!(store.list_notes().unwrap().is_empty());
}

fn goal_defaults_and_patching(store: &mut impl JournalStore) {
    let goal = store.create_goal("Slay dragon", "", "#3b82f6").unwrap();
    assert_eq!(goal.status, GoalStatus::Pending);
    assert_eq!(goal.color, "#3b82f6");
    assert!(goal.subtasks.is_empty());

    // Partial patch: only status changes, color and title survive.
    let patch = GoalPatch {
        status: Some(GoalStatus::Completed),
        ..GoalPatch::default()
    };
    store.update_goal(goal.id, &patch).unwrap();
    let loaded = store.get_goal(goal.id).unwrap().unwrap();
    assert_eq!(loaded.status, GoalStatus::Completed);
    assert_eq!(loaded.color, "#3b82f6");
    assert_eq!(loaded.title, "Slay dragon");

    // Any status swap is legal, including reopening a completed goal.
    let reopen = GoalPatch {
        status: Some(GoalStatus::Pending),
        ..GoalPatch::default()
    };
    store.update_goal(goal.id, &reopen).unwrap();
    assert_eq!(
        store.get_goal(goal.id).unwrap().unwrap().status,
        GoalStatus::Pending
    );

    // Unknown ids and empty patches are silent no-ops.
    store.update_goal(999_999_999, &patch).unwrap();
    store.update_goal(goal.id, &GoalPatch::default()).unwrap();

    store.delete_goal(goal.id).unwrap();
}

fn subtasks_inherit_goal_color(store: &mut impl JournalStore) {
    let goal = store.create_goal("Learn guitar", "", "#8b5cf6").unwrap();

    let inherited = store.create_subtask(goal.id, "Buy a guitar", None).unwrap();
    assert_eq!(inherited.color, "#8b5cf6");
    assert!(!inherited.completed);

    let explicit = store
        .create_subtask(goal.id, "Learn chords", Some(DEFAULT_COLOR))
        .unwrap();
    assert_eq!(explicit.color, DEFAULT_COLOR);

    // Later goal color changes do not rewrite existing subtasks.
    let recolor = GoalPatch {
        color: Some("#ef4444".to_string()),
        ..GoalPatch::default()
    };
    store.update_goal(goal.id, &recolor).unwrap();
    let loaded = store.get_subtask(inherited.id).unwrap().unwrap();
    assert_eq!(loaded.color, "#8b5cf6");

    // Subtasks come back in append order.
    let goal_loaded = store.get_goal(goal.id).unwrap().unwrap();
    let ids: Vec<_> = goal_loaded.subtasks.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![inherited.id, explicit.id]);

    let done = SubtaskPatch {
        completed: Some(true),
        ..SubtaskPatch::default()
    };
    store.update_subtask(inherited.id, &done).unwrap();
    assert!(store.get_subtask(inherited.id).unwrap().unwrap().completed);

    store.delete_subtask(explicit.id).unwrap();
    store.delete_subtask(explicit.id).unwrap();
    assert!(store.get_subtask(explicit.id).unwrap().is_none());

    store.delete_goal(goal.id).unwrap();
}

fn goal_delete_cascades(store: &mut impl JournalStore) {
    let goal = store.create_goal("Build a shed", "", DEFAULT_COLOR).unwrap();
    let sub_a = store.create_subtask(goal.id, "Buy lumber", None).unwrap();
    let sub_b = store.create_subtask(goal.id, "Pour slab", None).unwrap();

    store.delete_goal(goal.id).unwrap();

    assert!(store.get_goal(goal.id).unwrap().is_none());
    assert!(store.get_subtask(sub_a.id).unwrap().is_none());
    assert!(store.get_subtask(sub_b.id).unwrap().is_none());

    // Deleting again is a no-op.
    store.delete_goal(goal.id).unwrap();
}

fn unknown_goal_is_rejected(store: &mut impl JournalStore) {
    let err = store.create_subtask(123_456_789, "orphan", None).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::UnknownGoal(123_456_789))
    ));

    let err = store
        .append_subtasks(123_456_789, &["orphan".to_string()])
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::UnknownGoal(_))
    ));
}

fn stats_singleton_exists(store: &mut impl JournalStore) {
    let stats = store.stats().unwrap();
    assert!(stats.level >= 1);
    assert!((0..100).contains(&stats.xp));
}
