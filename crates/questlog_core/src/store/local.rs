//! Local key-value journal store (the browser-storage hosting mode).
//!
//! # Responsibility
//! - Persist the journal as JSON documents under the fixed keys
//!   `notes`, `goals` and `stats`.
//! - Honor the same contract as the SQLite backend without a database.
//!
//! # Invariants
//! - Ids are time-derived and strictly increasing within one store.
//! - Corrupt stored documents are surfaced as persistence errors, never
//!   silently reset.
//! - Each mutation persists the touched key before returning.

use crate::model::journal::{
    EntryId, Goal, GoalPatch, GoalStatus, Note, Snapshot, Subtask, SubtaskPatch, ValidationError,
    now_epoch_ms,
};
use crate::model::stats::{apply_xp, UserStats};
use crate::store::{JournalStore, StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

const KEY_NOTES: &str = "notes";
const KEY_GOALS: &str = "goals";
const KEY_STATS: &str = "stats";

/// Key-value backed implementation of the journal store contract.
///
/// All state lives in memory; a backing directory, when present, mirrors
/// every mutation so a reopened store resumes from the last committed write.
#[derive(Debug)]
pub struct LocalJournalStore {
    root: Option<PathBuf>,
    notes: Vec<Note>,
    goals: Vec<Goal>,
    stats: UserStats,
    next_id: EntryId,
}

impl LocalJournalStore {
    /// Creates an empty store with no backing directory.
    pub fn in_memory() -> Self {
        Self {
            root: None,
            notes: Vec::new(),
            goals: Vec::new(),
            stats: UserStats::default(),
            next_id: 0,
        }
    }

    /// Opens (or initializes) a store backed by `dir`.
    ///
    /// Missing keys initialize to their defaults; the stats record is
    /// created as `{xp: 0, level: 1}` on first use.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let root = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|err| {
            StoreError::Persistence(format!(
                "failed to create store directory `{}`: {err}",
                root.display()
            ))
        })?;

        let notes: Vec<Note> = read_key(&root, KEY_NOTES)?.unwrap_or_default();
        let goals: Vec<Goal> = read_key(&root, KEY_GOALS)?.unwrap_or_default();
        let stats: UserStats = read_key(&root, KEY_STATS)?.unwrap_or_default();

        let mut store = Self {
            root: Some(root),
            notes,
            goals,
            stats,
            next_id: 0,
        };
        store.next_id = store.highest_id();
        // First open seeds the singleton on disk.
        store.save_stats()?;
        Ok(store)
    }

    fn highest_id(&self) -> EntryId {
        let note_max = self.notes.iter().map(|n| n.id).max().unwrap_or(0);
        let goal_max = self
            .goals
            .iter()
            .flat_map(|g| std::iter::once(g.id).chain(g.subtasks.iter().map(|s| s.id)))
            .max()
            .unwrap_or(0);
        note_max.max(goal_max)
    }

    fn fresh_id(&mut self) -> EntryId {
        self.next_id = now_epoch_ms().max(self.next_id + 1);
        self.next_id
    }

    fn goal_mut(&mut self, id: EntryId) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|goal| goal.id == id)
    }

    fn save_notes(&self) -> StoreResult<()> {
        self.write_key(KEY_NOTES, &self.notes)
    }

    fn save_goals(&self) -> StoreResult<()> {
        self.write_key(KEY_GOALS, &self.goals)
    }

    fn save_stats(&self) -> StoreResult<()> {
        self.write_key(KEY_STATS, &self.stats)
    }

    fn write_key<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let Some(root) = &self.root else {
            return Ok(());
        };
        let path = key_path(root, key);
        let payload = serde_json::to_string(value).map_err(|err| {
            StoreError::Persistence(format!("failed to serialize key `{key}`: {err}"))
        })?;
        std::fs::write(&path, payload).map_err(|err| {
            StoreError::Persistence(format!(
                "failed to write `{}`: {err}",
                path.display()
            ))
        })
    }
}

impl JournalStore for LocalJournalStore {
    fn list_notes(&self) -> StoreResult<Vec<Note>> {
        let mut notes = self.notes.clone();
        notes.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(notes)
    }

    fn create_note(&mut self, content: &str) -> StoreResult<Note> {
        let note = Note {
            id: self.fresh_id(),
            content: content.to_string(),
            created_at: now_epoch_ms(),
        };
        self.notes.push(note.clone());
        self.save_notes()?;
        Ok(note)
    }

    fn delete_note(&mut self, id: EntryId) -> StoreResult<()> {
        self.notes.retain(|note| note.id != id);
        self.save_notes()
    }

    fn list_goals(&self) -> StoreResult<Vec<Goal>> {
        let mut goals = self.goals.clone();
        goals.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(goals)
    }

    fn get_goal(&self, id: EntryId) -> StoreResult<Option<Goal>> {
        Ok(self.goals.iter().find(|goal| goal.id == id).cloned())
    }

    fn create_goal(&mut self, title: &str, description: &str, color: &str) -> StoreResult<Goal> {
        let goal = Goal {
            id: self.fresh_id(),
            title: title.to_string(),
            description: description.to_string(),
            status: GoalStatus::Pending,
            color: color.to_string(),
            created_at: now_epoch_ms(),
            subtasks: Vec::new(),
        };
        self.goals.push(goal.clone());
        self.save_goals()?;
        Ok(goal)
    }

    fn update_goal(&mut self, id: EntryId, patch: &GoalPatch) -> StoreResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let Some(goal) = self.goal_mut(id) else {
            return Ok(());
        };
        if let Some(title) = &patch.title {
            goal.title = title.clone();
        }
        if let Some(description) = &patch.description {
            goal.description = description.clone();
        }
        if let Some(status) = patch.status {
            goal.status = status;
        }
        if let Some(color) = &patch.color {
            goal.color = color.clone();
        }
        self.save_goals()
    }

    fn delete_goal(&mut self, id: EntryId) -> StoreResult<()> {
        // Nested ownership makes the cascade implicit.
        self.goals.retain(|goal| goal.id != id);
        self.save_goals()
    }

    fn create_subtask(
        &mut self,
        goal_id: EntryId,
        title: &str,
        color: Option<&str>,
    ) -> StoreResult<Subtask> {
        let id = self.fresh_id();
        let Some(goal) = self.goal_mut(goal_id) else {
            return Err(ValidationError::UnknownGoal(goal_id).into());
        };
        let subtask = Subtask {
            id,
            goal_id,
            title: title.to_string(),
            completed: false,
            color: color.map_or_else(|| goal.color.clone(), str::to_string),
        };
        goal.subtasks.push(subtask.clone());
        self.save_goals()?;
        Ok(subtask)
    }

    fn append_subtasks(&mut self, goal_id: EntryId, titles: &[String]) -> StoreResult<Vec<Subtask>> {
        let mut ids = Vec::with_capacity(titles.len());
        for _ in titles {
            ids.push(self.fresh_id());
        }
        let Some(goal) = self.goal_mut(goal_id) else {
            return Err(ValidationError::UnknownGoal(goal_id).into());
        };
        let created: Vec<Subtask> = titles
            .iter()
            .zip(ids)
            .map(|(title, id)| Subtask {
                id,
                goal_id,
                title: title.clone(),
                completed: false,
                color: goal.color.clone(),
            })
            .collect();
        goal.subtasks.extend(created.iter().cloned());
        self.save_goals()?;
        Ok(created)
    }

    fn get_subtask(&self, id: EntryId) -> StoreResult<Option<Subtask>> {
        Ok(self
            .goals
            .iter()
            .flat_map(|goal| goal.subtasks.iter())
            .find(|subtask| subtask.id == id)
            .cloned())
    }

    fn update_subtask(&mut self, id: EntryId, patch: &SubtaskPatch) -> StoreResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let Some(subtask) = self
            .goals
            .iter_mut()
            .flat_map(|goal| goal.subtasks.iter_mut())
            .find(|subtask| subtask.id == id)
        else {
            return Ok(());
        };
        if let Some(title) = &patch.title {
            subtask.title = title.clone();
        }
        if let Some(completed) = patch.completed {
            subtask.completed = completed;
        }
        if let Some(color) = &patch.color {
            subtask.color = color.clone();
        }
        self.save_goals()
    }

    fn delete_subtask(&mut self, id: EntryId) -> StoreResult<()> {
        for goal in &mut self.goals {
            goal.subtasks.retain(|subtask| subtask.id != id);
        }
        self.save_goals()
    }

    fn stats(&self) -> StoreResult<UserStats> {
        Ok(self.stats)
    }

    fn add_xp(&mut self, amount: i64) -> StoreResult<UserStats> {
        self.stats = apply_xp(self.stats, amount);
        self.save_stats()?;
        Ok(self.stats)
    }

    fn export(&self) -> StoreResult<Snapshot> {
        Ok(Snapshot {
            notes: self.list_notes()?,
            goals: self.list_goals()?,
            stats: Some(self.stats),
        })
    }

    fn import(&mut self, snapshot: &Snapshot) -> StoreResult<()> {
        self.notes = snapshot.notes.clone();
        self.goals = snapshot.goals.clone();
        if let Some(stats) = snapshot.stats {
            self.stats = stats;
        }
        self.next_id = self.next_id.max(self.highest_id());
        self.save_notes()?;
        self.save_goals()?;
        self.save_stats()
    }
}

fn key_path(root: &Path, key: &str) -> PathBuf {
    root.join(format!("{key}.json"))
}

fn read_key<T: DeserializeOwned>(root: &Path, key: &str) -> StoreResult<Option<T>> {
    let path = key_path(root, key);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(StoreError::Persistence(format!(
                "failed to read `{}`: {err}",
                path.display()
            )));
        }
    };
    let value = serde_json::from_str(&raw).map_err(|err| {
        StoreError::Persistence(format!(
            "corrupt journal data in `{}`: {err}",
            path.display()
        ))
    })?;
    Ok(Some(value))
}
