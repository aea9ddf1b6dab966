//! Storage backends for the journal.
//!
//! # Responsibility
//! - Define the one persistence contract both hosting modes implement.
//! - Isolate SQLite/file-system details from service orchestration.
//!
//! # Invariants
//! - Deleting a goal removes its subtasks (cascade) in every backend.
//! - `add_xp` persists stats already normalized by `model::stats::apply_xp`.
//! - `import` replaces notes, goals and subtasks all-or-nothing; no reader
//!   observes a half-replaced store.

use crate::db::DbError;
use crate::model::journal::{
    EntryId, Goal, GoalPatch, Note, Snapshot, Subtask, SubtaskPatch, ValidationError,
};
use crate::model::stats::UserStats;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod local;
pub mod sqlite;

pub use local::LocalJournalStore;
pub use sqlite::SqliteJournalStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by journal persistence operations.
#[derive(Debug)]
pub enum StoreError {
    Validation(ValidationError),
    Db(DbError),
    /// Storage unavailable or stored data unreadable (local backend).
    Persistence(String),
    /// A persisted row/document violates the data model.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Persistence(message) => write!(f, "persistence failure: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted journal data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Persistence(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract shared by the SQLite and local key-value backends.
///
/// The trait covers structural behavior only: defaults, ordering, cascade
/// and idempotent deletes. Business rules (validation of user input, XP
/// crediting) live in the service layer so both backends share them.
pub trait JournalStore {
    /// Notes ordered newest-created-first.
    fn list_notes(&self) -> StoreResult<Vec<Note>>;
    /// Persists a note with a fresh id and the current timestamp.
    fn create_note(&mut self, content: &str) -> StoreResult<Note>;
    /// Removes a note if present; unknown ids are a silent no-op.
    fn delete_note(&mut self, id: EntryId) -> StoreResult<()>;

    /// Goals ordered newest-created-first, subtasks attached in append order.
    fn list_goals(&self) -> StoreResult<Vec<Goal>>;
    /// One goal with its subtasks, or `None`.
    fn get_goal(&self, id: EntryId) -> StoreResult<Option<Goal>>;
    /// Persists a pending goal with no subtasks. Defaults are resolved by
    /// the caller; `description` and `color` arrive concrete.
    fn create_goal(&mut self, title: &str, description: &str, color: &str) -> StoreResult<Goal>;
    /// Applies only the fields present in the patch; unknown ids and empty
    /// patches are silent no-ops.
    fn update_goal(&mut self, id: EntryId, patch: &GoalPatch) -> StoreResult<()>;
    /// Removes a goal and all its subtasks; unknown ids are a silent no-op.
    fn delete_goal(&mut self, id: EntryId) -> StoreResult<()>;

    /// Appends one subtask; `color = None` inherits the owning goal's
    /// current color. Unknown goals fail with `ValidationError::UnknownGoal`.
    fn create_subtask(
        &mut self,
        goal_id: EntryId,
        title: &str,
        color: Option<&str>,
    ) -> StoreResult<Subtask>;
    /// Appends one subtask per title atomically, inheriting the goal color.
    /// Either every subtask lands or none does.
    fn append_subtasks(&mut self, goal_id: EntryId, titles: &[String]) -> StoreResult<Vec<Subtask>>;
    /// One subtask by id, or `None`.
    fn get_subtask(&self, id: EntryId) -> StoreResult<Option<Subtask>>;
    /// Applies only the fields present in the patch; unknown ids and empty
    /// patches are silent no-ops.
    fn update_subtask(&mut self, id: EntryId, patch: &SubtaskPatch) -> StoreResult<()>;
    /// Removes a subtask if present; unknown ids are a silent no-op.
    fn delete_subtask(&mut self, id: EntryId) -> StoreResult<()>;

    /// Current stats; the singleton record always exists.
    fn stats(&self) -> StoreResult<UserStats>;
    /// Adds XP, rolls over full hundreds into levels, persists and returns
    /// the updated stats.
    fn add_xp(&mut self, amount: i64) -> StoreResult<UserStats>;

    /// Read-only snapshot of the entire store.
    fn export(&self) -> StoreResult<Snapshot>;
    /// Destructive replace of notes, goals and subtasks with the snapshot
    /// contents; stats are replaced only when the snapshot carries them.
    fn import(&mut self, snapshot: &Snapshot) -> StoreResult<()>;
}
