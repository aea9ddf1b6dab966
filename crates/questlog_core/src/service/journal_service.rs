//! Journal use-case service.
//!
//! # Responsibility
//! - Provide the user-facing operation set over any `JournalStore`.
//! - Validate input, credit XP and orchestrate the AI goal breakdown.
//!
//! # Invariants
//! - XP awards go through `JournalStore::add_xp`, which normalizes via
//!   the shared roll-over rule.
//! - At most one breakdown is in flight per goal at a time.
//! - A failed breakdown leaves the store untouched: no subtasks, no XP.

use crate::model::journal::{
    validate_goal_title, validate_note_content, validate_subtask_title, EntryId, Goal, GoalPatch,
    GoalStatus, Note, Snapshot, Subtask, SubtaskPatch, ValidationError, DEFAULT_COLOR,
};
use crate::model::stats::{
    UserStats, XP_GOAL_BREAKDOWN, XP_GOAL_COMPLETED, XP_GOAL_CREATED, XP_NOTE_CREATED,
    XP_SUBTASK_COMPLETED,
};
use crate::store::{JournalStore, StoreError, StoreResult};
use crate::suggest::{SuggestError, TaskSuggester};
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failures of the goal breakdown operation.
///
/// Everything here is recoverable; callers surface the message and the
/// goal stays exactly as it was.
#[derive(Debug)]
pub enum BreakdownError {
    /// A breakdown for this goal is already running.
    AlreadyRunning(EntryId),
    UnknownGoal(EntryId),
    Suggest(SuggestError),
    Store(StoreError),
}

impl Display for BreakdownError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyRunning(id) => {
                write!(f, "breakdown already in progress for goal {id}")
            }
            Self::UnknownGoal(id) => write!(f, "goal not found: {id}"),
            Self::Suggest(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BreakdownError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Suggest(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::AlreadyRunning(_) | Self::UnknownGoal(_) => None,
        }
    }
}

impl From<SuggestError> for BreakdownError {
    fn from(value: SuggestError) -> Self {
        Self::Suggest(value)
    }
}

impl From<StoreError> for BreakdownError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Use-case service over any journal store backend.
pub struct JournalService<S: JournalStore> {
    store: S,
    breakdowns_in_flight: HashSet<EntryId>,
}

impl<S: JournalStore> JournalService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self {
            store,
            breakdowns_in_flight: HashSet::new(),
        }
    }

    /// Direct read access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Notes ordered newest-created-first.
    pub fn list_notes(&self) -> StoreResult<Vec<Note>> {
        self.store.list_notes()
    }

    /// Creates a note and credits its XP award.
    ///
    /// # Contract
    /// - Empty/whitespace content is rejected before any persistence.
    pub fn create_note(&mut self, content: &str) -> StoreResult<Note> {
        validate_note_content(content)?;
        let note = self.store.create_note(content)?;
        self.store.add_xp(XP_NOTE_CREATED)?;
        info!(
            "event=note_create module=service status=ok id={} xp_awarded={}",
            note.id, XP_NOTE_CREATED
        );
        Ok(note)
    }

    /// Deletes a note; unknown ids succeed silently.
    pub fn delete_note(&mut self, id: EntryId) -> StoreResult<()> {
        self.store.delete_note(id)
    }

    /// Goals ordered newest-created-first with subtasks attached.
    pub fn list_goals(&self) -> StoreResult<Vec<Goal>> {
        self.store.list_goals()
    }

    /// One goal with its subtasks, or `None`.
    pub fn get_goal(&self, id: EntryId) -> StoreResult<Option<Goal>> {
        self.store.get_goal(id)
    }

    /// Creates a pending goal and credits its XP award.
    ///
    /// # Contract
    /// - Empty/whitespace titles are rejected.
    /// - Omitted description defaults to empty, omitted color to the
    ///   first preset.
    pub fn create_goal(
        &mut self,
        title: &str,
        description: Option<&str>,
        color: Option<&str>,
    ) -> StoreResult<Goal> {
        validate_goal_title(title)?;
        let goal = self.store.create_goal(
            title,
            description.unwrap_or(""),
            color.unwrap_or(DEFAULT_COLOR),
        )?;
        self.store.add_xp(XP_GOAL_CREATED)?;
        info!(
            "event=goal_create module=service status=ok id={} xp_awarded={}",
            goal.id, XP_GOAL_CREATED
        );
        Ok(goal)
    }

    /// Applies the present patch fields; unknown ids are a silent no-op.
    ///
    /// XP is granted for every patch carrying `status = completed`,
    /// including repeats on an already-completed goal; transitions away
    /// from `completed` never claw the award back.
    pub fn update_goal(&mut self, id: EntryId, patch: &GoalPatch) -> StoreResult<()> {
        self.store.update_goal(id, patch)?;
        if patch.status == Some(GoalStatus::Completed) {
            self.store.add_xp(XP_GOAL_COMPLETED)?;
            info!(
                "event=goal_complete module=service status=ok id={} xp_awarded={}",
                id, XP_GOAL_COMPLETED
            );
        }
        Ok(())
    }

    /// Deletes a goal and its subtasks; unknown ids succeed silently.
    pub fn delete_goal(&mut self, id: EntryId) -> StoreResult<()> {
        self.store.delete_goal(id)
    }

    /// Appends one subtask to a goal. No XP; only completing work earns it.
    ///
    /// # Contract
    /// - Empty/whitespace titles are rejected.
    /// - Omitted color inherits the owning goal's current color.
    /// - Unknown goals fail with `ValidationError::UnknownGoal`.
    pub fn create_subtask(
        &mut self,
        goal_id: EntryId,
        title: &str,
        color: Option<&str>,
    ) -> StoreResult<Subtask> {
        validate_subtask_title(title)?;
        self.store.create_subtask(goal_id, title, color)
    }

    /// Applies the present patch fields; unknown ids are a silent no-op.
    ///
    /// Flipping `completed` from false to true credits XP once; flipping
    /// back credits nothing and revokes nothing.
    pub fn update_subtask(&mut self, id: EntryId, patch: &SubtaskPatch) -> StoreResult<()> {
        let previous = self.store.get_subtask(id)?;
        self.store.update_subtask(id, patch)?;
        if let Some(previous) = previous {
            if !previous.completed && patch.completed == Some(true) {
                self.store.add_xp(XP_SUBTASK_COMPLETED)?;
            }
        }
        Ok(())
    }

    /// Deletes a subtask; unknown ids succeed silently.
    pub fn delete_subtask(&mut self, id: EntryId) -> StoreResult<()> {
        self.store.delete_subtask(id)
    }

    /// Current stats; the singleton record always exists.
    pub fn stats(&self) -> StoreResult<UserStats> {
        self.store.stats()
    }

    /// Adds XP with roll-over normalization and returns the updated stats.
    ///
    /// Amounts come from caller-internal award rules; negative values are
    /// a caller bug and rejected.
    pub fn add_xp(&mut self, amount: i64) -> StoreResult<UserStats> {
        if amount < 0 {
            return Err(ValidationError::NegativeXpAmount(amount).into());
        }
        self.store.add_xp(amount)
    }

    /// Read-only snapshot of the whole journal.
    pub fn export_all(&self) -> StoreResult<Snapshot> {
        self.store.export()
    }

    /// Destructive restore from a snapshot; data not present in the
    /// snapshot is discarded.
    pub fn import_all(&mut self, snapshot: &Snapshot) -> StoreResult<()> {
        self.store.import(snapshot)?;
        info!(
            "event=journal_import module=service status=ok notes={} goals={}",
            snapshot.notes.len(),
            snapshot.goals.len()
        );
        Ok(())
    }

    /// True while a breakdown for this goal is running; callers disable
    /// re-entry in the UI from this flag.
    pub fn breakdown_in_flight(&self, goal_id: EntryId) -> bool {
        self.breakdowns_in_flight.contains(&goal_id)
    }

    /// Asks the generative-text collaborator for subtasks and appends
    /// them to the goal.
    ///
    /// # Contract
    /// - Concurrent breakdowns for one goal are rejected, not interleaved.
    /// - The returned titles are appended atomically with the goal's
    ///   color; the batch credits XP exactly once.
    /// - On any collaborator failure nothing is persisted and no XP is
    ///   credited.
    pub fn breakdown_goal(
        &mut self,
        suggester: &dyn TaskSuggester,
        goal_id: EntryId,
    ) -> Result<Vec<Subtask>, BreakdownError> {
        if self.breakdowns_in_flight.contains(&goal_id) {
            return Err(BreakdownError::AlreadyRunning(goal_id));
        }
        let goal = self
            .store
            .get_goal(goal_id)?
            .ok_or(BreakdownError::UnknownGoal(goal_id))?;

        self.breakdowns_in_flight.insert(goal_id);
        let suggested = suggester.suggest_subtasks(&goal.title, &goal.description);
        self.breakdowns_in_flight.remove(&goal_id);

        let titles = match suggested {
            Ok(titles) => titles,
            Err(err) => {
                warn!(
                    "event=goal_breakdown module=service status=error id={} error={}",
                    goal_id, err
                );
                return Err(err.into());
            }
        };

        let created = self.store.append_subtasks(goal_id, &titles)?;
        self.store.add_xp(XP_GOAL_BREAKDOWN)?;
        info!(
            "event=goal_breakdown module=service status=ok id={} subtask_count={} xp_awarded={}",
            goal_id,
            created.len(),
            XP_GOAL_BREAKDOWN
        );
        Ok(created)
    }
}
