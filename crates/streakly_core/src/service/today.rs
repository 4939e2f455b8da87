//! Today view builder: which active habits are due on a date, and their status.

use crate::model::habit::Habit;
use crate::repo::checkin_repo::CheckInRepository;
use crate::repo::RepoResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the today view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayEntry {
    pub habit: Habit,
    pub is_due: bool,
    pub is_completed: bool,
    pub note: Option<String>,
}

/// Evaluates every active habit for `date`.
///
/// Inactive habits are skipped; output keeps the order of `habits`, which
/// callers load in creation order.
pub fn build_today<C: CheckInRepository>(
    date: NaiveDate,
    habits: &[Habit],
    check_ins: &C,
) -> RepoResult<Vec<TodayEntry>> {
    let mut entries = Vec::with_capacity(habits.len());
    for habit in habits.iter().filter(|habit| habit.is_active) {
        let check_in = check_ins.get_check_in(habit.id, date)?;
        let is_completed = check_in.as_ref().is_some_and(|check_in| check_in.completed);
        entries.push(TodayEntry {
            habit: habit.clone(),
            is_due: habit.schedule.is_due(date),
            is_completed,
            note: check_in.and_then(|check_in| check_in.note),
        });
    }
    Ok(entries)
}
