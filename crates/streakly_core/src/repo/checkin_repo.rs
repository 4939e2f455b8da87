//! Check-in repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist one completion record per (habit, date) with upsert semantics.
//! - Serve point lookups and date-ordered range scans for stats.
//!
//! # Invariants
//! - Habit-scoped operations fail with `NotFound` for unknown habits.
//! - Every write runs in one immediate transaction.
//! - Upserts overwrite `completed` and `note` but keep `created_at`.
//! - Marking done never touches an existing note.
//! - Range bounds are inclusive and results are ordered by date.

use crate::model::checkin::{date_to_db, parse_db_date, CheckIn, CheckInWrite};
use crate::model::habit::HabitId;
use crate::repo::{
    bool_to_int, ensure_connection_ready, ensure_habit_exists, int_to_bool, RepoError, RepoResult,
    NOW_MS_SQL,
};
use chrono::NaiveDate;
use log::{debug, info};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const CHECKIN_SELECT_SQL: &str = "SELECT
    habit_uuid,
    day,
    completed,
    note,
    created_at,
    updated_at
FROM checkins";

/// Repository interface for check-in persistence.
pub trait CheckInRepository {
    /// Inserts or overwrites the record for `(write.habit_id, write.date)`.
    fn upsert_check_in(&self, write: &CheckInWrite) -> RepoResult<CheckIn>;
    /// Applies several upserts atomically; returns the number written.
    fn upsert_check_ins(&self, writes: &[CheckInWrite]) -> RepoResult<usize>;
    /// Marks each habit done on `date` atomically, keeping any stored note.
    /// Returns the number written.
    fn mark_done(&self, habit_ids: &[HabitId], date: NaiveDate) -> RepoResult<usize>;
    fn get_check_in(&self, habit_id: HabitId, date: NaiveDate) -> RepoResult<Option<CheckIn>>;
    /// Records with `start <= date <= end`, ordered by date.
    fn list_check_ins_in_range(
        &self,
        habit_id: HabitId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<CheckIn>>;
    /// Full history of one habit, ordered by date.
    fn list_check_ins(&self, habit_id: HabitId) -> RepoResult<Vec<CheckIn>>;
    /// Records of every habit with `start <= date <= end`, ordered by date.
    fn list_check_ins_between(&self, start: NaiveDate, end: NaiveDate)
        -> RepoResult<Vec<CheckIn>>;
    /// Removes the record (explicit un-check). Returns whether one existed.
    fn delete_check_in(&self, habit_id: HabitId, date: NaiveDate) -> RepoResult<bool>;
}

impl<T: CheckInRepository + ?Sized> CheckInRepository for &T {
    fn upsert_check_in(&self, write: &CheckInWrite) -> RepoResult<CheckIn> {
        (**self).upsert_check_in(write)
    }

    fn upsert_check_ins(&self, writes: &[CheckInWrite]) -> RepoResult<usize> {
        (**self).upsert_check_ins(writes)
    }

    fn mark_done(&self, habit_ids: &[HabitId], date: NaiveDate) -> RepoResult<usize> {
        (**self).mark_done(habit_ids, date)
    }

    fn get_check_in(&self, habit_id: HabitId, date: NaiveDate) -> RepoResult<Option<CheckIn>> {
        (**self).get_check_in(habit_id, date)
    }

    fn list_check_ins_in_range(
        &self,
        habit_id: HabitId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<CheckIn>> {
        (**self).list_check_ins_in_range(habit_id, start, end)
    }

    fn list_check_ins(&self, habit_id: HabitId) -> RepoResult<Vec<CheckIn>> {
        (**self).list_check_ins(habit_id)
    }

    fn list_check_ins_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<CheckIn>> {
        (**self).list_check_ins_between(start, end)
    }

    fn delete_check_in(&self, habit_id: HabitId, date: NaiveDate) -> RepoResult<bool> {
        (**self).delete_check_in(habit_id, date)
    }
}

/// SQLite-backed check-in repository.
pub struct SqliteCheckInRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCheckInRepository<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version does not match.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CheckInRepository for SqliteCheckInRepository<'_> {
    fn upsert_check_in(&self, write: &CheckInWrite) -> RepoResult<CheckIn> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        upsert_in_tx(&tx, write)?;
        let stored = load_check_in(&tx, write.habit_id, write.date)?
            .ok_or(RepoError::NotFound(write.habit_id))?;
        tx.commit()?;

        info!(
            "event=checkin_upsert module=repo status=ok habit_id={} day={} completed={}",
            write.habit_id,
            date_to_db(write.date),
            write.completed
        );
        Ok(stored)
    }

    fn upsert_check_ins(&self, writes: &[CheckInWrite]) -> RepoResult<usize> {
        if writes.is_empty() {
            return Ok(0);
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for write in writes {
            upsert_in_tx(&tx, write)?;
        }
        tx.commit()?;

        info!(
            "event=checkin_upsert_batch module=repo status=ok count={}",
            writes.len()
        );
        Ok(writes.len())
    }

    fn mark_done(&self, habit_ids: &[HabitId], date: NaiveDate) -> RepoResult<usize> {
        if habit_ids.is_empty() {
            return Ok(0);
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let sql = format!(
            "INSERT INTO checkins (habit_uuid, day, completed)
             VALUES (?1, ?2, 1)
             ON CONFLICT (habit_uuid, day) DO UPDATE SET
                completed = 1,
                updated_at = {NOW_MS_SQL};"
        );
        for &habit_id in habit_ids {
            ensure_habit_exists(&tx, habit_id)?;
            tx.execute(&sql, params![habit_id.to_string(), date_to_db(date)])?;
        }
        tx.commit()?;

        info!(
            "event=checkin_mark_done module=repo status=ok day={} count={}",
            date_to_db(date),
            habit_ids.len()
        );
        Ok(habit_ids.len())
    }

    fn get_check_in(&self, habit_id: HabitId, date: NaiveDate) -> RepoResult<Option<CheckIn>> {
        ensure_habit_exists(self.conn, habit_id)?;
        load_check_in(self.conn, habit_id, date)
    }

    fn list_check_ins_in_range(
        &self,
        habit_id: HabitId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<CheckIn>> {
        ensure_habit_exists(self.conn, habit_id)?;
        if end < start {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(&format!(
            "{CHECKIN_SELECT_SQL}
             WHERE habit_uuid = ?1
               AND day >= ?2
               AND day <= ?3
             ORDER BY day ASC;"
        ))?;
        let rows = stmt.query(params![
            habit_id.to_string(),
            date_to_db(start),
            date_to_db(end)
        ])?;
        collect_check_ins(rows)
    }

    fn list_check_ins(&self, habit_id: HabitId) -> RepoResult<Vec<CheckIn>> {
        ensure_habit_exists(self.conn, habit_id)?;
        let mut stmt = self.conn.prepare(&format!(
            "{CHECKIN_SELECT_SQL}
             WHERE habit_uuid = ?1
             ORDER BY day ASC;"
        ))?;
        let rows = stmt.query([habit_id.to_string()])?;
        collect_check_ins(rows)
    }

    fn list_check_ins_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<CheckIn>> {
        if end < start {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(&format!(
            "{CHECKIN_SELECT_SQL}
             WHERE day >= ?1
               AND day <= ?2
             ORDER BY day ASC, habit_uuid ASC;"
        ))?;
        let rows = stmt.query(params![date_to_db(start), date_to_db(end)])?;
        collect_check_ins(rows)
    }

    fn delete_check_in(&self, habit_id: HabitId, date: NaiveDate) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_habit_exists(&tx, habit_id)?;
        let changed = tx.execute(
            "DELETE FROM checkins WHERE habit_uuid = ?1 AND day = ?2;",
            params![habit_id.to_string(), date_to_db(date)],
        )?;
        tx.commit()?;

        info!(
            "event=checkin_delete module=repo status=ok habit_id={} day={} removed={}",
            habit_id,
            date_to_db(date),
            changed > 0
        );
        Ok(changed > 0)
    }
}

fn upsert_in_tx(tx: &Transaction<'_>, write: &CheckInWrite) -> RepoResult<()> {
    ensure_habit_exists(tx, write.habit_id)?;
    tx.execute(
        &format!(
            "INSERT INTO checkins (
            habit_uuid,
            day,
            completed,
            note
        ) VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT (habit_uuid, day) DO UPDATE SET
            completed = excluded.completed,
            note = excluded.note,
            updated_at = {NOW_MS_SQL};"
        ),
        params![
            write.habit_id.to_string(),
            date_to_db(write.date),
            bool_to_int(write.completed),
            write.normalized_note(),
        ],
    )?;
    debug!(
        "event=checkin_write module=repo status=ok habit_id={} day={}",
        write.habit_id,
        date_to_db(write.date)
    );
    Ok(())
}

fn load_check_in(
    conn: &Connection,
    habit_id: HabitId,
    date: NaiveDate,
) -> RepoResult<Option<CheckIn>> {
    let mut stmt = conn.prepare(&format!(
        "{CHECKIN_SELECT_SQL} WHERE habit_uuid = ?1 AND day = ?2;"
    ))?;
    let mut rows = stmt.query(params![habit_id.to_string(), date_to_db(date)])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_check_in_row(row)?));
    }
    Ok(None)
}

fn collect_check_ins(mut rows: rusqlite::Rows<'_>) -> RepoResult<Vec<CheckIn>> {
    let mut check_ins = Vec::new();
    while let Some(row) = rows.next()? {
        check_ins.push(parse_check_in_row(row)?);
    }
    Ok(check_ins)
}

fn parse_check_in_row(row: &Row<'_>) -> RepoResult<CheckIn> {
    let uuid_text: String = row.get("habit_uuid")?;
    let habit_id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{uuid_text}` in checkins.habit_uuid"
        ))
    })?;

    let day_text: String = row.get("day")?;
    let date = parse_db_date(&day_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid date `{day_text}` in checkins.day"))
    })?;

    Ok(CheckIn {
        habit_id,
        date,
        completed: int_to_bool(row.get("completed")?, "checkins.completed")?,
        note: row.get("note")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
