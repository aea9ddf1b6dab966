//! Note/goal/subtask entities, partial-update patches and the backup snapshot.
//!
//! # Responsibility
//! - Define the persisted record shapes shared by both storage backends.
//! - Provide the validation helpers every write path must run first.
//!
//! # Invariants
//! - `created_at` is set once at creation and never mutated.
//! - A `Subtask` belongs to exactly one `Goal` for its whole lifetime.
//! - Colors are free-form hex strings; only creation applies defaults,
//!   updates accept any value.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Stable identifier for notes, goals and subtasks.
///
/// Monotonically increasing per store: SQLite rowids in the relational
/// backend, an epoch-milliseconds seeded counter in the local backend.
pub type EntryId = i64;

/// Color palette offered by the composer UI.
///
/// The first entry doubles as the default for goals created without an
/// explicit color.
pub const PRESET_COLORS: [&str; 7] = [
    "#10b981", // emerald
    "#3b82f6", // blue
    "#f59e0b", // amber
    "#ef4444", // red
    "#8b5cf6", // violet
    "#ec4899", // pink
    "#06b6d4", // cyan
];

/// Default color applied when a goal is created without one.
pub const DEFAULT_COLOR: &str = PRESET_COLORS[0];

/// Goal lifecycle state.
///
/// Any state may swap to any other directly; there is no terminal state.
/// A completed goal can be reopened, a failed one retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Pending,
    Completed,
    Failed,
}

impl Default for GoalStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl GoalStatus {
    /// Storage representation shared by the SQLite columns and the
    /// snapshot format.
    pub fn as_db(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parses the storage representation back into the enum.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Free-text journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: EntryId,
    /// Non-empty free text.
    pub content: String,
    /// Epoch milliseconds, immutable after creation.
    #[serde(default)]
    pub created_at: i64,
}

/// Child checklist item owned by exactly one goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: EntryId,
    pub goal_id: EntryId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Captured from the owning goal at creation time; later goal color
    /// changes do not propagate here.
    #[serde(default = "default_color_string")]
    pub color: String,
}

/// User-defined objective with an ordered subtask checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: EntryId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: GoalStatus,
    #[serde(default = "default_color_string")]
    pub color: String,
    #[serde(default)]
    pub created_at: i64,
    /// Append-ordered; exclusively owned, deleted with the goal.
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

/// Partial update for a goal; `None` means "field not provided".
///
/// An explicit presence marker per field keeps "not provided"
/// distinguishable from "set to the default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<GoalStatus>,
    pub color: Option<String>,
}

impl GoalPatch {
    /// True when no field is present; such a patch is a no-op.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.color.is_none()
    }
}

/// Partial update for a subtask; `None` means "field not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtaskPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub color: Option<String>,
}

impl SubtaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none() && self.color.is_none()
    }
}

/// Full exported state used for backup and restore.
///
/// Goals carry their subtasks nested. Records missing optional fields
/// pick up the creation defaults during deserialization, per record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    /// Absent stats leave the store's current stats untouched on import.
    #[serde(default)]
    pub stats: Option<crate::model::stats::UserStats>,
}

/// Validation failures for journal write operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyNoteContent,
    EmptyGoalTitle,
    EmptySubtaskTitle,
    UnknownGoal(EntryId),
    NegativeXpAmount(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyNoteContent => write!(f, "note content is required"),
            Self::EmptyGoalTitle => write!(f, "goal title is required"),
            Self::EmptySubtaskTitle => write!(f, "subtask title is required"),
            Self::UnknownGoal(id) => write!(f, "goal not found: {id}"),
            Self::NegativeXpAmount(amount) => {
                write!(f, "xp amount must be >= 0, got {amount}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Rejects empty or whitespace-only note content.
pub fn validate_note_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyNoteContent);
    }
    Ok(())
}

/// Rejects empty or whitespace-only goal titles.
pub fn validate_goal_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyGoalTitle);
    }
    Ok(())
}

/// Rejects empty or whitespace-only subtask titles.
pub fn validate_subtask_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptySubtaskTitle);
    }
    Ok(())
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

fn default_color_string() -> String {
    DEFAULT_COLOR.to_string()
}
