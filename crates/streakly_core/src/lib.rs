//! Core domain logic for Streakly, a personal habit tracker.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod stats;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::checkin::{CheckIn, CheckInWrite};
pub use model::habit::{Habit, HabitDraft, HabitId};
pub use model::schedule::{is_due, weekday_from_number, Schedule, WeekdaySet, WEEKDAY_LABELS};
pub use model::settings::ReminderTime;
pub use model::validation::ValidationError;
pub use repo::checkin_repo::{CheckInRepository, SqliteCheckInRepository};
pub use repo::habit_repo::{HabitListQuery, HabitRepository, SqliteHabitRepository};
pub use repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
pub use repo::{RepoError, RepoResult};
pub use service::checkin_service::CheckInService;
pub use service::dashboard_service::{
    DashboardService, HabitDetail, QuickStat, ReminderBanner, TodayView,
};
pub use service::habit_service::HabitService;
pub use service::today::{build_today, TodayEntry};
pub use service::{ServiceError, ServiceResult};
pub use stats::calendar::{
    month_bounds, CalendarCell, CellStatus, DayProgress, HabitCalendar, MonthProgress,
};
pub use stats::streak::{compute_stats, StatsSnapshot, StatsWindow, DEFAULT_WINDOW_DAYS};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
