//! Habit repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/edit/deactivate/read APIs over the `habits` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths normalize `HabitDraft` before SQL mutations.
//! - Habit names are unique; collisions surface as `DuplicateName`.
//! - Lists are ordered by creation (`created_at ASC, rowid ASC`).
//! - Read paths reject invalid persisted state instead of masking it.

use crate::model::habit::{Habit, HabitDraft, HabitId};
use crate::model::schedule::Schedule;
use crate::repo::{
    bool_to_int, ensure_connection_ready, ensure_habit_exists, int_to_bool, RepoError, RepoResult,
    NOW_MS_SQL,
};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const HABIT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    description,
    schedule_type,
    custom_days,
    is_active,
    created_at,
    updated_at
FROM habits";

/// Query options for listing habits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HabitListQuery {
    pub include_inactive: bool,
}

impl HabitListQuery {
    pub fn active() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            include_inactive: true,
        }
    }
}

/// Repository interface for habit persistence.
pub trait HabitRepository {
    fn create_habit(&self, draft: &HabitDraft) -> RepoResult<Habit>;
    fn update_habit(&self, id: HabitId, draft: &HabitDraft) -> RepoResult<Habit>;
    fn set_habit_active(&self, id: HabitId, active: bool) -> RepoResult<Habit>;
    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>>;
    fn list_habits(&self, query: &HabitListQuery) -> RepoResult<Vec<Habit>>;
}

impl<T: HabitRepository + ?Sized> HabitRepository for &T {
    fn create_habit(&self, draft: &HabitDraft) -> RepoResult<Habit> {
        (**self).create_habit(draft)
    }

    fn update_habit(&self, id: HabitId, draft: &HabitDraft) -> RepoResult<Habit> {
        (**self).update_habit(id, draft)
    }

    fn set_habit_active(&self, id: HabitId, active: bool) -> RepoResult<Habit> {
        (**self).set_habit_active(id, active)
    }

    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>> {
        (**self).get_habit(id)
    }

    fn list_habits(&self, query: &HabitListQuery) -> RepoResult<Vec<Habit>> {
        (**self).list_habits(query)
    }
}

/// SQLite-backed habit repository.
pub struct SqliteHabitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHabitRepository<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version does not match.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl HabitRepository for SqliteHabitRepository<'_> {
    fn create_habit(&self, draft: &HabitDraft) -> RepoResult<Habit> {
        let draft = draft.normalized()?;
        let id = Uuid::new_v4();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_name_available(&tx, &draft.name, None)?;
        tx.execute(
            "INSERT INTO habits (
                uuid,
                name,
                description,
                schedule_type,
                custom_days,
                is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, 1);",
            params![
                id.to_string(),
                draft.name.as_str(),
                draft.description.as_str(),
                draft.schedule.type_name(),
                draft.schedule.custom_days_db_string(),
            ],
        )?;
        let habit = load_habit(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;

        info!(
            "event=habit_create module=repo status=ok habit_id={} schedule={}",
            habit.id,
            habit.schedule.type_name()
        );
        Ok(habit)
    }

    fn update_habit(&self, id: HabitId, draft: &HabitDraft) -> RepoResult<Habit> {
        let draft = draft.normalized()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_habit_exists(&tx, id)?;
        ensure_name_available(&tx, &draft.name, Some(id))?;
        tx.execute(
            &format!(
                "UPDATE habits
             SET
                name = ?1,
                description = ?2,
                schedule_type = ?3,
                custom_days = ?4,
                updated_at = {NOW_MS_SQL}
             WHERE uuid = ?5;"
            ),
            params![
                draft.name.as_str(),
                draft.description.as_str(),
                draft.schedule.type_name(),
                draft.schedule.custom_days_db_string(),
                id.to_string(),
            ],
        )?;
        let habit = load_habit(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;

        info!(
            "event=habit_update module=repo status=ok habit_id={} schedule={}",
            habit.id,
            habit.schedule.type_name()
        );
        Ok(habit)
    }

    fn set_habit_active(&self, id: HabitId, active: bool) -> RepoResult<Habit> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            &format!(
                "UPDATE habits
             SET
                is_active = ?1,
                updated_at = {NOW_MS_SQL}
             WHERE uuid = ?2;"
            ),
            params![bool_to_int(active), id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        let habit = load_habit(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;

        info!(
            "event=habit_set_active module=repo status=ok habit_id={} active={}",
            id, active
        );
        Ok(habit)
    }

    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>> {
        load_habit(self.conn, id)
    }

    fn list_habits(&self, query: &HabitListQuery) -> RepoResult<Vec<Habit>> {
        let mut sql = format!("{HABIT_SELECT_SQL} WHERE 1 = 1");
        if !query.include_inactive {
            sql.push_str(" AND is_active = 1");
        }
        sql.push_str(" ORDER BY created_at ASC, rowid ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut habits = Vec::new();
        while let Some(row) = rows.next()? {
            habits.push(parse_habit_row(row)?);
        }
        Ok(habits)
    }
}

fn load_habit(conn: &Connection, id: HabitId) -> RepoResult<Option<Habit>> {
    let mut stmt = conn.prepare(&format!("{HABIT_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_habit_row(row)?));
    }
    Ok(None)
}

fn ensure_name_available(conn: &Connection, name: &str, except: Option<HabitId>) -> RepoResult<()> {
    let owner: Option<String> = conn
        .query_row(
            "SELECT uuid FROM habits WHERE name = ?1;",
            [name],
            |row| row.get(0),
        )
        .optional()?;

    match owner {
        Some(owner) if except.map(|id| id.to_string()).as_deref() != Some(owner.as_str()) => {
            Err(RepoError::DuplicateName(name.to_string()))
        }
        _ => Ok(()),
    }
}

fn parse_habit_row(row: &Row<'_>) -> RepoResult<Habit> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in habits.uuid"))
    })?;

    let schedule_type: String = row.get("schedule_type")?;
    let custom_days: String = row.get("custom_days")?;
    let schedule = Schedule::from_db(&schedule_type, &custom_days).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid schedule `{schedule_type}`/`{custom_days}` for habit {id}"
        ))
    })?;

    let habit = Habit {
        id,
        name: row.get("name")?,
        description: row.get("description")?,
        schedule,
        is_active: int_to_bool(row.get("is_active")?, "habits.is_active")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    habit
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("habit {id}: {err}")))?;
    Ok(habit)
}
