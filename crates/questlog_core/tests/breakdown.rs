//! AI goal breakdown: batch append, XP, and clean failure.

use questlog_core::db::open_db_in_memory;
use questlog_core::{
    BreakdownError, JournalService, JournalStore, LocalJournalStore, SqliteJournalStore,
    SuggestError, TaskSuggester, UserStats,
};

/// Deterministic stand-in for the generative-text collaborator.
struct ScriptedSuggester {
    titles: Vec<&'static str>,
}

impl TaskSuggester for ScriptedSuggester {
    fn suggest_subtasks(&self, _title: &str, _description: &str) -> Result<Vec<String>, SuggestError> {
        Ok(self.titles.iter().map(|t| t.to_string()).collect())
    }
}

struct FailingSuggester;

impl TaskSuggester for FailingSuggester {
    fn suggest_subtasks(&self, _title: &str, _description: &str) -> Result<Vec<String>, SuggestError> {
        Err(SuggestError::MalformedResponse(
            "expected JSON array of strings".to_string(),
        ))
    }
}

#[test]
fn sqlite_breakdown_appends_batch_and_credits_once() {
    let mut conn = open_db_in_memory().unwrap();
    let store = SqliteJournalStore::try_new(&mut conn).unwrap();
    exercise_breakdown(JournalService::new(store));
}

#[test]
fn local_breakdown_appends_batch_and_credits_once() {
    exercise_breakdown(JournalService::new(LocalJournalStore::in_memory()));
}

fn exercise_breakdown<S: JournalStore>(mut service: JournalService<S>) {
    let goal = service
        .create_goal("Learn guitar", Some("an old dream"), Some("#8b5cf6"))
        .unwrap();
    let stats_before = service.stats().unwrap();

    let suggester = ScriptedSuggester {
        titles: vec!["Buy a guitar", "Learn chords", "Practice daily"],
    };
    let created = service.breakdown_goal(&suggester, goal.id).unwrap();

    assert_eq!(created.len(), 3);
    for subtask in &created {
        assert_eq!(subtask.goal_id, goal.id);
        assert_eq!(subtask.color, "#8b5cf6");
        assert!(!subtask.completed);
    }

    let loaded = service.get_goal(goal.id).unwrap().unwrap();
    let titles: Vec<_> = loaded.subtasks.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Buy a guitar", "Learn chords", "Practice daily"]);

    // +20 exactly once for the whole batch.
    assert_eq!(
        service.stats().unwrap(),
        UserStats {
            xp: stats_before.xp + 20,
            level: stats_before.level
        }
    );
    assert!(!service.breakdown_in_flight(goal.id));
}

#[test]
fn failed_breakdown_leaves_the_goal_untouched() {
    let mut service = JournalService::new(LocalJournalStore::in_memory());
    let goal = service.create_goal("Learn guitar", None, None).unwrap();
    let stats_before = service.stats().unwrap();

    let err = service.breakdown_goal(&FailingSuggester, goal.id).unwrap_err();
    assert!(matches!(
        err,
        BreakdownError::Suggest(SuggestError::MalformedResponse(_))
    ));

    let loaded = service.get_goal(goal.id).unwrap().unwrap();
    assert!(loaded.subtasks.is_empty());
    assert_eq!(service.stats().unwrap(), stats_before);

    // The in-flight guard is released after a failure; a retry works.
    assert!(!service.breakdown_in_flight(goal.id));
    let suggester = ScriptedSuggester {
        titles: vec!["Buy a guitar"],
    };
    let created = service.breakdown_goal(&suggester, goal.id).unwrap();
    assert_eq!(created.len(), 1);
}

#[test]
fn breakdown_of_unknown_goal_is_rejected() {
    let mut service = JournalService::new(LocalJournalStore::in_memory());
    let stats_before = service.stats().unwrap();

    let suggester = ScriptedSuggester {
        titles: vec!["anything"],
    };
    let err = service.breakdown_goal(&suggester, 404).unwrap_err();
    assert!(matches!(err, BreakdownError::UnknownGoal(404)));
    assert_eq!(service.stats().unwrap(), stats_before);
}
