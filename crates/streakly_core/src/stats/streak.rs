//! Streak and success-rate calculator.
//!
//! # Invariants
//! - Current streak walks backward from `as_of`, skipping non-due days, and
//!   stops at the first due day without a completed check-in.
//! - Best streak is the longest run of completed due days up to `as_of`;
//!   non-due days never break a run.
//! - Success rate is `completed due days / due days` over the window clipped
//!   to `as_of`, and `0.0` when the clipped window has no due days.

use crate::model::checkin::CheckIn;
use crate::model::schedule::Schedule;
use crate::stats::days_inclusive;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Trailing window used by the dashboard and detail views.
pub const DEFAULT_WINDOW_DAYS: u32 = 28;

/// Inclusive date window for success-rate computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl StatsWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days` days ending at (and including) `end`. Zero days yields an empty window.
    ///
    /// Saturates at the calendar bounds instead of overflowing.
    pub fn trailing(end: NaiveDate, days: u32) -> Self {
        let start = match days.checked_sub(1) {
            Some(span) => end
                .checked_sub_days(Days::new(u64::from(span)))
                .unwrap_or(NaiveDate::MIN),
            None => end.succ_opt().unwrap_or(NaiveDate::MAX),
        };
        Self { start, end }
    }
}

/// Derived, non-persisted statistics for one habit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub current_streak: u32,
    pub best_streak: u32,
    /// In `[0.0, 1.0]`.
    pub success_rate: f64,
    pub completed_due_days: u32,
    pub total_due_days: u32,
}

/// Computes streaks over the full history and the success rate over `window`.
///
/// `check_ins` must belong to the habit owning `schedule`; order does not matter.
pub fn compute_stats(
    schedule: &Schedule,
    check_ins: &[CheckIn],
    as_of: NaiveDate,
    window: StatsWindow,
) -> StatsSnapshot {
    let completed = completed_dates(check_ins);
    let (completed_due_days, total_due_days) = due_counts(schedule, &completed, as_of, window);

    StatsSnapshot {
        current_streak: current_streak(schedule, &completed, as_of),
        best_streak: best_streak(schedule, &completed, as_of),
        success_rate: ratio(completed_due_days, total_due_days),
        completed_due_days,
        total_due_days,
    }
}

/// Dates with a completed check-in.
pub fn completed_dates(check_ins: &[CheckIn]) -> BTreeSet<NaiveDate> {
    check_ins
        .iter()
        .filter(|check_in| check_in.completed)
        .map(|check_in| check_in.date)
        .collect()
}

/// Consecutive completed due days ending at the most recent due day on or before `as_of`.
pub fn current_streak(schedule: &Schedule, completed: &BTreeSet<NaiveDate>, as_of: NaiveDate) -> u32 {
    // Nothing before the earliest completion can extend a streak.
    let Some(&earliest) = completed.first() else {
        return 0;
    };

    let mut streak = 0;
    let mut day = as_of;
    while day >= earliest {
        if schedule.is_due(day) {
            if !completed.contains(&day) {
                break;
            }
            streak += 1;
        }
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }
    streak
}

/// Longest run of completed due days on or before `as_of`.
pub fn best_streak(schedule: &Schedule, completed: &BTreeSet<NaiveDate>, as_of: NaiveDate) -> u32 {
    let (Some(&earliest), Some(&latest)) = (completed.first(), completed.last()) else {
        return 0;
    };

    // Days after the last completion cannot extend a run.
    let mut best = 0;
    let mut run = 0;
    for day in days_inclusive(earliest, latest.min(as_of)) {
        if !schedule.is_due(day) {
            continue;
        }
        if completed.contains(&day) {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

/// `(completed due days, due days)` inside `window`, ignoring days after `as_of`.
pub fn due_counts(
    schedule: &Schedule,
    completed: &BTreeSet<NaiveDate>,
    as_of: NaiveDate,
    window: StatsWindow,
) -> (u32, u32) {
    let end = window.end.min(as_of);
    let mut done = 0;
    let mut due = 0;
    for day in days_inclusive(window.start, end).filter(|day| schedule.is_due(*day)) {
        due += 1;
        if completed.contains(&day) {
            done += 1;
        }
    }
    (done, due)
}

pub(crate) fn ratio(done: u32, due: u32) -> f64 {
    if due == 0 {
        return 0.0;
    }
    f64::from(done) / f64::from(due)
}
