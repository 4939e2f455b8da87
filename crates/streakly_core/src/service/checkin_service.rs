//! Check-in use-case service.
//!
//! # Responsibility
//! - Record, overwrite and remove check-ins for any date (backfill allowed).
//! - Mark every due habit done for a date in one transaction.
//!
//! # Invariants
//! - Check-ins for unknown habits fail with `ServiceError::HabitNotFound`.
//! - "Mark all done" keeps notes that already exist for that date.

use crate::model::checkin::{CheckIn, CheckInWrite};
use crate::model::habit::HabitId;
use crate::repo::checkin_repo::CheckInRepository;
use crate::repo::habit_repo::{HabitListQuery, HabitRepository};
use crate::service::ServiceResult;
use chrono::NaiveDate;
use log::info;

/// Use-case service for recording habit completion.
pub struct CheckInService<H: HabitRepository, C: CheckInRepository> {
    habits: H,
    check_ins: C,
}

impl<H: HabitRepository, C: CheckInRepository> CheckInService<H, C> {
    pub fn new(habits: H, check_ins: C) -> Self {
        Self { habits, check_ins }
    }

    /// Inserts or overwrites the check-in for `(write.habit_id, write.date)`.
    pub fn record(&self, write: &CheckInWrite) -> ServiceResult<CheckIn> {
        Ok(self.check_ins.upsert_check_in(write)?)
    }

    /// Marks a habit done on `date`, replacing any note.
    pub fn check(
        &self,
        habit_id: HabitId,
        date: NaiveDate,
        note: Option<String>,
    ) -> ServiceResult<CheckIn> {
        self.record(&CheckInWrite::new(habit_id, date, true).with_note(note))
    }

    /// Removes the check-in for `date`. Returns whether one existed.
    pub fn uncheck(&self, habit_id: HabitId, date: NaiveDate) -> ServiceResult<bool> {
        Ok(self.check_ins.delete_check_in(habit_id, date)?)
    }

    pub fn get(&self, habit_id: HabitId, date: NaiveDate) -> ServiceResult<Option<CheckIn>> {
        Ok(self.check_ins.get_check_in(habit_id, date)?)
    }

    /// Marks every active habit due on `date` as done. Returns the number written.
    pub fn mark_all_done(&self, date: NaiveDate) -> ServiceResult<usize> {
        let due = self
            .habits
            .list_habits(&HabitListQuery::active())?
            .into_iter()
            .filter(|habit| habit.schedule.is_due(date))
            .map(|habit| habit.id)
            .collect::<Vec<_>>();

        let written = self.check_ins.mark_done(&due, date)?;
        info!(
            "event=checkin_mark_all module=service status=ok day={} count={}",
            date, written
        );
        Ok(written)
    }
}
