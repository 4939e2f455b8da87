//! Read-side views: today dashboard, month progress, habit detail, reminder settings.
//!
//! # Responsibility
//! - Load current data for one interaction and compute derived view models.
//! - Own the reminder-time setting used by the today banner.
//!
//! # Invariants
//! - Views only include active habits, except `habit_detail`, which works
//!   for deactivated habits too.
//! - Stats are computed as of the viewed date; later days never count.

use crate::model::checkin::CheckIn;
use crate::model::habit::{Habit, HabitId};
use crate::model::settings::{ReminderTime, REMINDER_TIME_KEY};
use crate::repo::checkin_repo::CheckInRepository;
use crate::repo::habit_repo::{HabitListQuery, HabitRepository};
use crate::repo::settings_repo::SettingsRepository;
use crate::service::today::{build_today, TodayEntry};
use crate::service::{ServiceError, ServiceResult};
use crate::stats::calendar::{
    habit_calendar, month_bounds, month_progress, HabitCalendar, MonthProgress,
};
use crate::stats::streak::{compute_stats, StatsSnapshot, StatsWindow, DEFAULT_WINDOW_DAYS};
use chrono::{Days, NaiveDate, NaiveDateTime};
use log::info;
use serde::Serialize;

/// Number of days listed in the detail view's recent history.
const RECENT_HISTORY_DAYS: u32 = 14;

/// Shown when the reminder time has passed and due habits are still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReminderBanner {
    pub open_count: usize,
    pub reminder_time: ReminderTime,
}

/// Streak and trailing success rate for one due habit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickStat {
    pub habit_id: HabitId,
    pub name: String,
    pub stats: StatsSnapshot,
}

/// Everything the dashboard needs for one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodayView {
    pub date: NaiveDate,
    /// Active habits in creation order, due or not.
    pub entries: Vec<TodayEntry>,
    pub reminder: Option<ReminderBanner>,
    /// One entry per due habit, same order as `entries`.
    pub quick_stats: Vec<QuickStat>,
}

impl TodayView {
    pub fn due_entries(&self) -> impl Iterator<Item = &TodayEntry> {
        self.entries.iter().filter(|entry| entry.is_due)
    }

    pub fn open_count(&self) -> usize {
        self.due_entries()
            .filter(|entry| !entry.is_completed)
            .count()
    }
}

/// Per-habit detail page model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitDetail {
    pub habit: Habit,
    pub as_of: NaiveDate,
    pub window: StatsWindow,
    pub stats: StatsSnapshot,
    pub calendar: HabitCalendar,
    /// Check-ins from the last two weeks, newest first.
    pub recent: Vec<CheckIn>,
}

/// Read-side service composing habits, check-ins and settings.
pub struct DashboardService<H: HabitRepository, C: CheckInRepository, S: SettingsRepository> {
    habits: H,
    check_ins: C,
    settings: S,
}

impl<H, C, S> DashboardService<H, C, S>
where
    H: HabitRepository,
    C: CheckInRepository,
    S: SettingsRepository,
{
    pub fn new(habits: H, check_ins: C, settings: S) -> Self {
        Self {
            habits,
            check_ins,
            settings,
        }
    }

    /// Builds the dashboard for `date`. `now` is the current local time and
    /// only matters for the reminder banner when `date` is today.
    pub fn today_view(&self, date: NaiveDate, now: NaiveDateTime) -> ServiceResult<TodayView> {
        let habits = self.habits.list_habits(&HabitListQuery::active())?;
        let entries = build_today(date, &habits, &self.check_ins)?;
        let window = StatsWindow::trailing(date, DEFAULT_WINDOW_DAYS);

        let mut quick_stats = Vec::new();
        for entry in entries.iter().filter(|entry| entry.is_due) {
            let history = self.check_ins.list_check_ins(entry.habit.id)?;
            quick_stats.push(QuickStat {
                habit_id: entry.habit.id,
                name: entry.habit.name.clone(),
                stats: compute_stats(&entry.habit.schedule, &history, date, window),
            });
        }

        let mut view = TodayView {
            date,
            entries,
            reminder: None,
            quick_stats,
        };
        let reminder_time = self.reminder_time()?;
        let open_count = view.open_count();
        if date == now.date() && now.time() >= reminder_time.time() && open_count > 0 {
            view.reminder = Some(ReminderBanner {
                open_count,
                reminder_time,
            });
        }
        Ok(view)
    }

    /// Aggregate progress for the month containing `month_of`.
    pub fn month_progress(
        &self,
        month_of: NaiveDate,
        as_of: NaiveDate,
    ) -> ServiceResult<MonthProgress> {
        let habits = self.habits.list_habits(&HabitListQuery::active())?;
        let (start, end) = month_bounds(month_of);
        let check_ins = self.check_ins.list_check_ins_between(start, end)?;
        Ok(month_progress(&habits, &check_ins, month_of, as_of))
    }

    /// Stats over an arbitrary window.
    pub fn habit_stats(
        &self,
        habit_id: HabitId,
        as_of: NaiveDate,
        window: StatsWindow,
    ) -> ServiceResult<StatsSnapshot> {
        let habit = self.load_habit(habit_id)?;
        let history = self.check_ins.list_check_ins(habit_id)?;
        Ok(compute_stats(&habit.schedule, &history, as_of, window))
    }

    /// Detail view: streaks, trailing success rate, month calendar and recent history.
    pub fn habit_detail(
        &self,
        habit_id: HabitId,
        month_of: NaiveDate,
        as_of: NaiveDate,
    ) -> ServiceResult<HabitDetail> {
        let habit = self.load_habit(habit_id)?;
        let history = self.check_ins.list_check_ins(habit_id)?;
        let window = StatsWindow::trailing(as_of, DEFAULT_WINDOW_DAYS);
        let stats = compute_stats(&habit.schedule, &history, as_of, window);
        let calendar = habit_calendar(&habit.schedule, &history, month_of, as_of);

        let recent_start = as_of
            .checked_sub_days(Days::new(u64::from(RECENT_HISTORY_DAYS - 1)))
            .unwrap_or(NaiveDate::MIN);
        let mut recent = history
            .into_iter()
            .filter(|check_in| check_in.date >= recent_start && check_in.date <= as_of)
            .collect::<Vec<_>>();
        recent.reverse();

        Ok(HabitDetail {
            habit,
            as_of,
            window,
            stats,
            calendar,
            recent,
        })
    }

    /// Configured reminder time, or the default when unset or malformed.
    pub fn reminder_time(&self) -> ServiceResult<ReminderTime> {
        Ok(self
            .settings
            .get_setting(REMINDER_TIME_KEY)?
            .map(|value| ReminderTime::parse_or_default(&value))
            .unwrap_or_default())
    }

    /// Validates and stores a new `HH:MM` reminder time.
    pub fn set_reminder_time(&self, value: &str) -> ServiceResult<ReminderTime> {
        let reminder = ReminderTime::parse(value)?;
        self.settings
            .set_setting(REMINDER_TIME_KEY, &reminder.to_string())?;
        info!("event=reminder_set module=service status=ok reminder_time={reminder}");
        Ok(reminder)
    }

    fn load_habit(&self, habit_id: HabitId) -> ServiceResult<Habit> {
        self.habits
            .get_habit(habit_id)?
            .ok_or(ServiceError::HabitNotFound(habit_id))
    }
}
