//! Service-level rules: validation and XP crediting over any backend.

use questlog_core::db::open_db_in_memory;
use questlog_core::{
    GoalPatch, GoalStatus, JournalService, JournalStore, LocalJournalStore, SqliteJournalStore,
    StoreError, SubtaskPatch, UserStats, ValidationError,
};

#[test]
fn sqlite_backend_applies_the_xp_rules() {
    let mut conn = open_db_in_memory().unwrap();
    let store = SqliteJournalStore::try_new(&mut conn).unwrap();
    exercise_xp_rules(JournalService::new(store));
}

#[test]
fn local_backend_applies_the_xp_rules() {
    exercise_xp_rules(JournalService::new(LocalJournalStore::in_memory()));
}

fn exercise_xp_rules<S: JournalStore>(mut service: JournalService<S>) {
    assert_eq!(service.stats().unwrap(), UserStats { xp: 0, level: 1 });

    // Empty input never mutates anything.
    let err = service.create_note("   ").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::EmptyNoteContent)
    ));
    let err = service.create_goal("", None, None).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::EmptyGoalTitle)
    ));
    assert_eq!(service.stats().unwrap(), UserStats { xp: 0, level: 1 });

    // Note creation: +5, listed first.
    let note = service.create_note("Met a dragon").unwrap();
    assert_eq!(service.list_notes().unwrap()[0].id, note.id);
    assert_eq!(service.stats().unwrap(), UserStats { xp: 5, level: 1 });

    // Goal creation: +10, explicit color kept.
    let goal = service
        .create_goal("Slay dragon", None, Some("#3b82f6"))
        .unwrap();
    assert_eq!(goal.status, GoalStatus::Pending);
    assert_eq!(goal.color, "#3b82f6");
    assert!(goal.subtasks.is_empty());
    assert_eq!(service.stats().unwrap(), UserStats { xp: 15, level: 1 });

    // Completing a goal: +50, awarded per completed patch, repeats included.
    let complete = GoalPatch {
        status: Some(GoalStatus::Completed),
        ..GoalPatch::default()
    };
    service.update_goal(goal.id, &complete).unwrap();
    assert_eq!(service.stats().unwrap(), UserStats { xp: 65, level: 1 });
    service.update_goal(goal.id, &complete).unwrap();
    assert_eq!(service.stats().unwrap(), UserStats { xp: 15, level: 2 });

    // Reopening never claws XP back.
    let reopen = GoalPatch {
        status: Some(GoalStatus::Pending),
        ..GoalPatch::default()
    };
    service.update_goal(goal.id, &reopen).unwrap();
    assert_eq!(service.stats().unwrap(), UserStats { xp: 15, level: 2 });

    // Manual subtasks are free; completing one pays +10 once.
    let subtask = service.create_subtask(goal.id, "Sharpen sword", None).unwrap();
    assert_eq!(service.stats().unwrap(), UserStats { xp: 15, level: 2 });

    let done = SubtaskPatch {
        completed: Some(true),
        ..SubtaskPatch::default()
    };
    let undone = SubtaskPatch {
        completed: Some(false),
        ..SubtaskPatch::default()
    };
    service.update_subtask(subtask.id, &done).unwrap();
    assert_eq!(service.stats().unwrap(), UserStats { xp: 25, level: 2 });

    // Re-completing an already-completed subtask earns nothing.
    service.update_subtask(subtask.id, &done).unwrap();
    assert_eq!(service.stats().unwrap(), UserStats { xp: 25, level: 2 });

    // A false -> true -> false round trip nets exactly +10.
    service.update_subtask(subtask.id, &undone).unwrap();
    assert_eq!(service.stats().unwrap(), UserStats { xp: 25, level: 2 });

    // Empty subtask titles are rejected.
    let err = service.create_subtask(goal.id, " ", None).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::EmptySubtaskTitle)
    ));

    // Direct awards roll over; negative amounts are a caller bug.
    let stats = service.add_xp(90).unwrap();
    assert_eq!(stats, UserStats { xp: 15, level: 3 });
    let err = service.add_xp(-1).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::NegativeXpAmount(-1))
    ));
    assert_eq!(service.stats().unwrap(), UserStats { xp: 15, level: 3 });
}

#[test]
fn xp_stays_normalized_across_many_awards() {
    let mut service = JournalService::new(LocalJournalStore::in_memory());
    let mut total = 0_i64;
    for amount in [5, 10, 50, 20, 10, 95, 0, 240, 5] {
        total += amount;
        let stats = service.add_xp(amount).unwrap();
        assert!((0..100).contains(&stats.xp));
        assert!(stats.level >= 1);
        // Level gain equals the number of full hundreds ever accumulated.
        assert_eq!(stats.level, 1 + total / 100);
        assert_eq!(stats.xp, total % 100);
    }
}
