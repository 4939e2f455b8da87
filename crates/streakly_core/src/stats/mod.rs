//! Derived habit statistics.
//!
//! # Responsibility
//! - Compute streaks and success rates from a habit's schedule and history.
//! - Build month-level progress and calendar projections for the UI.
//!
//! # Invariants
//! - Every computation is pure; callers load data and pass it in.
//! - Dates after `as_of` never count as due, done or missed.

pub mod calendar;
pub mod streak;

use chrono::NaiveDate;

/// Inclusive, ascending day iterator. Empty when `end < start`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}
