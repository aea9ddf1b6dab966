//! SQLite-backed journal store (the relational hosting mode).
//!
//! # Responsibility
//! - Map the `JournalStore` contract onto the migrated SQLite schema.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Connections must come from `db::open_db`/`open_db_in_memory` so
//!   migrations and `foreign_keys=ON` are already in place.
//! - `import` runs inside a single transaction.

use crate::model::journal::{
    EntryId, Goal, GoalPatch, GoalStatus, Note, Snapshot, Subtask, SubtaskPatch, ValidationError,
    now_epoch_ms,
};
use crate::model::stats::{apply_xp, UserStats};
use crate::store::{JournalStore, StoreError, StoreResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const NOTE_SELECT_SQL: &str = "SELECT id, content, created_at FROM notes";
const GOAL_SELECT_SQL: &str = "SELECT id, title, description, status, color, created_at FROM goals";
const SUBTASK_SELECT_SQL: &str = "SELECT id, goal_id, title, completed, color FROM subtasks";

/// SQLite-backed implementation of the journal store contract.
pub struct SqliteJournalStore<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteJournalStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    ///
    /// Re-asserts the stats singleton so even databases restored from
    /// foreign backups expose exactly one `user_stats` row.
    pub fn try_new(conn: &'conn mut Connection) -> StoreResult<Self> {
        conn.execute(
            "INSERT OR IGNORE INTO user_stats (id, xp, level) VALUES (1, 0, 1);",
            [],
        )?;
        Ok(Self { conn })
    }

    fn subtasks_for_goal(&self, goal_id: EntryId) -> StoreResult<Vec<Subtask>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SUBTASK_SELECT_SQL} WHERE goal_id = ?1 ORDER BY id ASC;"))?;
        let mut rows = stmt.query([goal_id])?;
        let mut subtasks = Vec::new();
        while let Some(row) = rows.next()? {
            subtasks.push(parse_subtask_row(row)?);
        }
        Ok(subtasks)
    }

    fn goal_color(&self, goal_id: EntryId) -> StoreResult<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT color FROM goals WHERE id = ?1;")?;
        let mut rows = stmt.query([goal_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(row.get(0)?));
        }
        Ok(None)
    }
}

impl JournalStore for SqliteJournalStore<'_> {
    fn list_notes(&self) -> StoreResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} ORDER BY created_at DESC, id DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn create_note(&mut self, content: &str) -> StoreResult<Note> {
        let created_at = now_epoch_ms();
        self.conn.execute(
            "INSERT INTO notes (content, created_at) VALUES (?1, ?2);",
            params![content, created_at],
        )?;
        Ok(Note {
            id: self.conn.last_insert_rowid(),
            content: content.to_string(),
            created_at,
        })
    }

    fn delete_note(&mut self, id: EntryId) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        Ok(())
    }

    fn list_goals(&self) -> StoreResult<Vec<Goal>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GOAL_SELECT_SQL} ORDER BY created_at DESC, id DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }
        for goal in &mut goals {
            goal.subtasks = self.subtasks_for_goal(goal.id)?;
        }
        Ok(goals)
    }

    fn get_goal(&self, id: EntryId) -> StoreResult<Option<Goal>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GOAL_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        let mut goal = match rows.next()? {
            Some(row) => parse_goal_row(row)?,
            None => return Ok(None),
        };
        goal.subtasks = self.subtasks_for_goal(goal.id)?;
        Ok(Some(goal))
    }

    fn create_goal(&mut self, title: &str, description: &str, color: &str) -> StoreResult<Goal> {
        let created_at = now_epoch_ms();
        self.conn.execute(
            "INSERT INTO goals (title, description, status, color, created_at)
             VALUES (?1, ?2, 'pending', ?3, ?4);",
            params![title, description, color, created_at],
        )?;
        Ok(Goal {
            id: self.conn.last_insert_rowid(),
            title: title.to_string(),
            description: description.to_string(),
            status: GoalStatus::Pending,
            color: color.to_string(),
            created_at,
            subtasks: Vec::new(),
        })
    }

    fn update_goal(&mut self, id: EntryId, patch: &GoalPatch) -> StoreResult<()> {
        let mut assignments: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(title) = &patch.title {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(description) = &patch.description {
            assignments.push("description = ?");
            bind_values.push(Value::Text(description.clone()));
        }
        if let Some(status) = patch.status {
            assignments.push("status = ?");
            bind_values.push(Value::Text(status.as_db().to_string()));
        }
        if let Some(color) = &patch.color {
            assignments.push("color = ?");
            bind_values.push(Value::Text(color.clone()));
        }

        if assignments.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "UPDATE goals SET {} WHERE id = ?;",
            assignments.join(", ")
        );
        bind_values.push(Value::Integer(id));
        self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(())
    }

    fn delete_goal(&mut self, id: EntryId) -> StoreResult<()> {
        // Subtasks go with it via ON DELETE CASCADE.
        self.conn
            .execute("DELETE FROM goals WHERE id = ?1;", [id])?;
        Ok(())
    }

    fn create_subtask(
        &mut self,
        goal_id: EntryId,
        title: &str,
        color: Option<&str>,
    ) -> StoreResult<Subtask> {
        let inherited = self
            .goal_color(goal_id)?
            .ok_or(StoreError::Validation(ValidationError::UnknownGoal(goal_id)))?;
        let color = color.map_or(inherited, str::to_string);

        self.conn.execute(
            "INSERT INTO subtasks (goal_id, title, completed, color) VALUES (?1, ?2, 0, ?3);",
            params![goal_id, title, color.as_str()],
        )?;
        Ok(Subtask {
            id: self.conn.last_insert_rowid(),
            goal_id,
            title: title.to_string(),
            completed: false,
            color,
        })
    }

    fn append_subtasks(&mut self, goal_id: EntryId, titles: &[String]) -> StoreResult<Vec<Subtask>> {
        let color = self
            .goal_color(goal_id)?
            .ok_or(StoreError::Validation(ValidationError::UnknownGoal(goal_id)))?;

        let tx = self.conn.transaction()?;
        let mut created = Vec::with_capacity(titles.len());
        for title in titles {
            tx.execute(
                "INSERT INTO subtasks (goal_id, title, completed, color) VALUES (?1, ?2, 0, ?3);",
                params![goal_id, title.as_str(), color.as_str()],
            )?;
            created.push(Subtask {
                id: tx.last_insert_rowid(),
                goal_id,
                title: title.clone(),
                completed: false,
                color: color.clone(),
            });
        }
        tx.commit()?;
        Ok(created)
    }

    fn get_subtask(&self, id: EntryId) -> StoreResult<Option<Subtask>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SUBTASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_subtask_row(row)?));
        }
        Ok(None)
    }

    fn update_subtask(&mut self, id: EntryId, patch: &SubtaskPatch) -> StoreResult<()> {
        let mut assignments: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(title) = &patch.title {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(completed) = patch.completed {
            assignments.push("completed = ?");
            bind_values.push(Value::Integer(bool_to_int(completed)));
        }
        if let Some(color) = &patch.color {
            assignments.push("color = ?");
            bind_values.push(Value::Text(color.clone()));
        }

        if assignments.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "UPDATE subtasks SET {} WHERE id = ?;",
            assignments.join(", ")
        );
        bind_values.push(Value::Integer(id));
        self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(())
    }

    fn delete_subtask(&mut self, id: EntryId) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM subtasks WHERE id = ?1;", [id])?;
        Ok(())
    }

    fn stats(&self) -> StoreResult<UserStats> {
        let stats = self.conn.query_row(
            "SELECT xp, level FROM user_stats WHERE id = 1;",
            [],
            |row| {
                Ok(UserStats {
                    xp: row.get(0)?,
                    level: row.get(1)?,
                })
            },
        )?;
        Ok(stats)
    }

    fn add_xp(&mut self, amount: i64) -> StoreResult<UserStats> {
        let updated = apply_xp(self.stats()?, amount);
        self.conn.execute(
            "UPDATE user_stats SET xp = ?1, level = ?2 WHERE id = 1;",
            params![updated.xp, updated.level],
        )?;
        Ok(updated)
    }

    fn export(&self) -> StoreResult<Snapshot> {
        Ok(Snapshot {
            notes: self.list_notes()?,
            goals: self.list_goals()?,
            stats: Some(self.stats()?),
        })
    }

    fn import(&mut self, snapshot: &Snapshot) -> StoreResult<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM subtasks;", [])?;
        tx.execute("DELETE FROM goals;", [])?;
        tx.execute("DELETE FROM notes;", [])?;

        for note in &snapshot.notes {
            tx.execute(
                "INSERT INTO notes (id, content, created_at) VALUES (?1, ?2, ?3);",
                params![note.id, note.content.as_str(), note.created_at],
            )?;
        }
        for goal in &snapshot.goals {
            tx.execute(
                "INSERT INTO goals (id, title, description, status, color, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    goal.id,
                    goal.title.as_str(),
                    goal.description.as_str(),
                    goal.status.as_db(),
                    goal.color.as_str(),
                    goal.created_at,
                ],
            )?;
            for subtask in &goal.subtasks {
                tx.execute(
                    "INSERT INTO subtasks (id, goal_id, title, completed, color)
                     VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        subtask.id,
                        goal.id,
                        subtask.title.as_str(),
                        bool_to_int(subtask.completed),
                        subtask.color.as_str(),
                    ],
                )?;
            }
        }
        if let Some(stats) = snapshot.stats {
            tx.execute(
                "UPDATE user_stats SET xp = ?1, level = ?2 WHERE id = 1;",
                params![stats.xp, stats.level],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

fn parse_note_row(row: &Row<'_>) -> StoreResult<Note> {
    Ok(Note {
        id: row.get("id")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_goal_row(row: &Row<'_>) -> StoreResult<Goal> {
    let status_text: String = row.get("status")?;
    let status = GoalStatus::parse(&status_text).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid status `{status_text}` in goals.status"))
    })?;

    Ok(Goal {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status,
        color: row.get("color")?,
        created_at: row.get("created_at")?,
        subtasks: Vec::new(),
    })
}

fn parse_subtask_row(row: &Row<'_>) -> StoreResult<Subtask> {
    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid completed value `{other}` in subtasks.completed"
            )));
        }
    };

    Ok(Subtask {
        id: row.get("id")?,
        goal_id: row.get("goal_id")?,
        title: row.get("title")?,
        completed,
        color: row.get("color")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
