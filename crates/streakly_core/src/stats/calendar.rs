//! Month-level projections: aggregate progress and per-habit calendars.

use crate::model::checkin::CheckIn;
use crate::model::habit::{Habit, HabitId};
use crate::model::schedule::Schedule;
use crate::stats::days_inclusive;
use crate::stats::streak::{completed_dates, ratio};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// First and last day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date.with_day(1).unwrap_or(date);
    let next_month_start = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    };
    let end = next_month_start
        .and_then(|next| next.pred_opt())
        .unwrap_or(start);
    (start, end)
}

/// Due/done counts for one day across all tracked habits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayProgress {
    pub date: NaiveDate,
    pub due: u32,
    pub done: u32,
    pub cumulative_due: u32,
    pub cumulative_done: u32,
    /// `done / due` for this day, `0.0` when nothing was due.
    pub completion_rate: f64,
    /// Day lies after `as_of`; counts stay zero.
    pub is_future: bool,
}

/// Aggregate completion for a calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthProgress {
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub days: Vec<DayProgress>,
    pub total_due: u32,
    pub total_done: u32,
    pub completion_rate: f64,
}

/// Builds per-day progress for the month containing `month_of`.
///
/// `check_ins` may span any habits; records for habits not in `habits` are ignored.
pub fn month_progress(
    habits: &[Habit],
    check_ins: &[CheckIn],
    month_of: NaiveDate,
    as_of: NaiveDate,
) -> MonthProgress {
    let (month_start, month_end) = month_bounds(month_of);

    let mut completed_by_habit: HashMap<HabitId, BTreeSet<NaiveDate>> = HashMap::new();
    for check_in in check_ins.iter().filter(|check_in| check_in.completed) {
        completed_by_habit
            .entry(check_in.habit_id)
            .or_default()
            .insert(check_in.date);
    }

    let mut days = Vec::new();
    let mut cumulative_due = 0;
    let mut cumulative_done = 0;
    for date in days_inclusive(month_start, month_end) {
        let is_future = date > as_of;
        let (mut due, mut done) = (0, 0);
        if !is_future {
            for habit in habits.iter().filter(|habit| habit.schedule.is_due(date)) {
                due += 1;
                if completed_by_habit
                    .get(&habit.id)
                    .is_some_and(|completed| completed.contains(&date))
                {
                    done += 1;
                }
            }
        }
        cumulative_due += due;
        cumulative_done += done;
        days.push(DayProgress {
            date,
            due,
            done,
            cumulative_due,
            cumulative_done,
            completion_rate: ratio(done, due),
            is_future,
        });
    }

    MonthProgress {
        month_start,
        month_end,
        days,
        total_due: cumulative_due,
        total_done: cumulative_done,
        completion_rate: ratio(cumulative_done, cumulative_due),
    }
}

/// Display state of one calendar cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    /// Padding day from the previous month.
    OutsideMonth,
    NotDue,
    Done,
    Missed,
    /// Due on `as_of` and not completed yet.
    Open,
    /// Due after `as_of`.
    Upcoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub status: CellStatus,
}

/// Monday-aligned month grid for a single habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitCalendar {
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    /// Rows of seven cells, Monday first. The last row may be shorter.
    pub weeks: Vec<Vec<CalendarCell>>,
}

/// Builds the calendar grid for the month containing `month_of`.
pub fn habit_calendar(
    schedule: &Schedule,
    check_ins: &[CheckIn],
    month_of: NaiveDate,
    as_of: NaiveDate,
) -> HabitCalendar {
    let (month_start, month_end) = month_bounds(month_of);
    let completed = completed_dates(check_ins);
    let padding = Days::new(u64::from(month_start.weekday().num_days_from_monday()));
    let first_monday = month_start.checked_sub_days(padding).unwrap_or(month_start);

    let mut weeks: Vec<Vec<CalendarCell>> = Vec::new();
    for date in days_inclusive(first_monday, month_end) {
        let status = if date < month_start {
            CellStatus::OutsideMonth
        } else if !schedule.is_due(date) {
            CellStatus::NotDue
        } else if completed.contains(&date) && date <= as_of {
            CellStatus::Done
        } else if date > as_of {
            CellStatus::Upcoming
        } else if date == as_of {
            CellStatus::Open
        } else {
            CellStatus::Missed
        };

        let cell = CalendarCell { date, status };
        match weeks.last_mut() {
            Some(week) if week.len() < 7 => week.push(cell),
            _ => weeks.push(vec![cell]),
        }
    }

    HabitCalendar {
        month_start,
        month_end,
        weeks,
    }
}

#[cfg(test)]
mod tests {
    use super::{habit_calendar, month_bounds, CellStatus};
    use crate::model::schedule::Schedule;
    use chrono::{Datelike, NaiveDate};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn month_bounds_handle_december_and_leap_february() {
        assert_eq!(
            month_bounds(date(2023, 12, 15)),
            (date(2023, 12, 1), date(2023, 12, 31))
        );
        assert_eq!(
            month_bounds(date(2024, 2, 10)),
            (date(2024, 2, 1), date(2024, 2, 29))
        );
    }

    #[test]
    fn calendar_pads_to_monday_and_marks_statuses() {
        // May 2024 starts on a Wednesday.
        let calendar = habit_calendar(&Schedule::Weekdays, &[], date(2024, 5, 20), date(2024, 5, 2));
        let first_week = &calendar.weeks[0];
        assert_eq!(first_week.len(), 7);
        assert_eq!(first_week[0].date, date(2024, 4, 29));
        assert_eq!(first_week[0].status, CellStatus::OutsideMonth);
        assert_eq!(first_week[2].status, CellStatus::Missed);
        assert_eq!(first_week[3].status, CellStatus::Open);
        assert_eq!(first_week[4].status, CellStatus::Upcoming);
        assert_eq!(first_week[5].status, CellStatus::NotDue);

        let cells = calendar.weeks.iter().map(Vec::len).sum::<usize>();
        assert_eq!(cells, 2 + 31);
    }

    #[test]
    fn calendar_of_first_representable_month_does_not_overflow() {
        let calendar = habit_calendar(&Schedule::Daily, &[], NaiveDate::MIN, NaiveDate::MIN);
        assert_eq!(calendar.month_start.day(), 1);
        assert!(!calendar.weeks.is_empty());
    }
}
