//! Core domain logic for Questlog, a gamified journaling and goal tracker.
//! This crate is the single source of truth for business invariants:
//! validation, XP leveling, subtask ownership and the backup format.

pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod suggest;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::journal::{
    EntryId, Goal, GoalPatch, GoalStatus, Note, Snapshot, Subtask, SubtaskPatch, ValidationError,
    DEFAULT_COLOR, PRESET_COLORS,
};
pub use model::stats::{apply_xp, UserStats};
pub use service::journal_service::{BreakdownError, JournalService};
pub use store::{JournalStore, LocalJournalStore, SqliteJournalStore, StoreError, StoreResult};
pub use suggest::{HttpTaskSuggester, SuggestError, SuggesterConfig, TaskSuggester};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
