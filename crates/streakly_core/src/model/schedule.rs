//! Habit recurrence rules and the due-date evaluator.
//!
//! # Responsibility
//! - Model schedules as `Daily | Weekdays | CustomDays`.
//! - Decide whether a habit is due on a given calendar date.
//! - Convert schedules to and from their `schedule_type` + `custom_days`
//!   storage columns.
//!
//! # Invariants
//! - `Weekdays` is always Monday through Friday.
//! - A valid schedule has at least one due weekday.
//! - Weekday numbers in storage are `0..=6` with Monday = 0.

use crate::model::validation::ValidationError;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Short labels indexed by `Weekday::num_days_from_monday`.
pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Compact set of weekdays, one bit per day (bit 0 = Monday).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<u8>", try_from = "Vec<u8>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: Self = Self(0);
    pub const MON_TO_FRI: Self = Self(0b001_1111);
    pub const ALL: Self = Self(0b111_1111);

    pub fn from_weekdays(days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut set = Self::EMPTY;
        for day in days {
            set.insert(day);
        }
        set
    }

    /// Builds a set from `0..=6` day numbers, returning `None` on out-of-range input.
    pub fn from_day_numbers(numbers: impl IntoIterator<Item = u8>) -> Option<Self> {
        let mut set = Self::EMPTY;
        for number in numbers {
            set.insert(weekday_from_number(number)?);
        }
        Some(set)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= day_bit(day);
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & day_bit(day) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates contained days in Monday-first order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        ALL_WEEKDAYS.into_iter().filter(move |day| self.contains(*day))
    }

    /// Storage form: sorted, comma-separated day numbers (`"0,2,4"`).
    pub fn to_db_string(self) -> String {
        self.iter()
            .map(|day| day.num_days_from_monday().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parses the storage form. Blank input is the empty set.
    pub fn parse_db_string(value: &str) -> Result<Self, String> {
        let mut set = Self::EMPTY;
        for part in value.split(',') {
            let token = part.trim();
            if token.is_empty() {
                continue;
            }
            let day = token
                .parse::<u8>()
                .ok()
                .and_then(weekday_from_number)
                .ok_or_else(|| format!("invalid weekday number `{token}`"))?;
            set.insert(day);
        }
        Ok(set)
    }

    /// Human-readable label list, e.g. `Mon, Wed, Fri`.
    pub fn labels(self) -> String {
        self.iter()
            .map(weekday_label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(value: WeekdaySet) -> Self {
        value
            .iter()
            .map(|day| day.num_days_from_monday() as u8)
            .collect()
    }
}

impl TryFrom<Vec<u8>> for WeekdaySet {
    type Error = String;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_day_numbers(value).ok_or_else(|| "weekday numbers must be 0..=6".to_string())
    }
}

/// Recurrence rule deciding on which dates a habit is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "days", rename_all = "snake_case")]
pub enum Schedule {
    /// Due every calendar day.
    Daily,
    /// Due Monday through Friday.
    Weekdays,
    /// Due on the configured weekdays only.
    CustomDays(WeekdaySet),
}

impl Schedule {
    /// Returns whether a habit with this schedule is due on `date`.
    pub fn is_due(&self, date: NaiveDate) -> bool {
        self.due_weekdays().contains(date.weekday())
    }

    /// Returns the weekdays on which this schedule is due.
    pub fn due_weekdays(&self) -> WeekdaySet {
        match self {
            Self::Daily => WeekdaySet::ALL,
            Self::Weekdays => WeekdaySet::MON_TO_FRI,
            Self::CustomDays(days) => *days,
        }
    }

    /// Rejects schedules that would never be due.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::CustomDays(days) if days.is_empty() => Err(ValidationError::EmptyCustomDays),
            _ => Ok(()),
        }
    }

    /// Value of the `schedule_type` storage column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekdays => "weekdays",
            Self::CustomDays(_) => "custom",
        }
    }

    /// Value of the `custom_days` storage column.
    pub fn custom_days_db_string(&self) -> String {
        match self {
            Self::CustomDays(days) => days.to_db_string(),
            Self::Daily | Self::Weekdays => String::new(),
        }
    }

    /// Rebuilds a schedule from its storage columns.
    ///
    /// Returns `None` for an unknown `schedule_type` or malformed `custom_days`.
    pub fn from_db(schedule_type: &str, custom_days: &str) -> Option<Self> {
        match schedule_type {
            "daily" => Some(Self::Daily),
            "weekdays" => Some(Self::Weekdays),
            "custom" => WeekdaySet::parse_db_string(custom_days)
                .ok()
                .map(Self::CustomDays),
            _ => None,
        }
    }

    /// Short description for list views.
    pub fn describe(&self) -> String {
        match self {
            Self::Daily => "Every day".to_string(),
            Self::Weekdays => "Weekdays (Mon-Fri)".to_string(),
            Self::CustomDays(days) => days.labels(),
        }
    }
}

/// Returns whether a habit with `schedule` is due on `date`.
pub fn is_due(schedule: &Schedule, date: NaiveDate) -> bool {
    schedule.is_due(date)
}

/// Label for a weekday, e.g. `Mon`.
pub fn weekday_label(day: Weekday) -> &'static str {
    WEEKDAY_LABELS[day.num_days_from_monday() as usize]
}

/// Maps `0..=6` (Monday = 0) to a weekday.
pub fn weekday_from_number(number: u8) -> Option<Weekday> {
    ALL_WEEKDAYS.get(usize::from(number)).copied()
}

fn day_bit(day: Weekday) -> u8 {
    1 << day.num_days_from_monday()
}

#[cfg(test)]
mod tests {
    use super::{is_due, Schedule, WeekdaySet};
    use chrono::{Duration, NaiveDate, Weekday};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    #[test]
    fn daily_is_due_every_day() {
        for offset in 0..14 {
            assert!(is_due(&Schedule::Daily, monday() + Duration::days(offset)));
        }
    }

    #[test]
    fn weekdays_skip_saturday_and_sunday() {
        let due = (0..7)
            .map(|offset| is_due(&Schedule::Weekdays, monday() + Duration::days(offset)))
            .collect::<Vec<_>>();
        assert_eq!(due, vec![true, true, true, true, true, false, false]);
    }

    #[test]
    fn custom_days_follow_configured_set() {
        let schedule =
            Schedule::CustomDays(WeekdaySet::from_weekdays([Weekday::Tue, Weekday::Sun]));
        assert!(!schedule.is_due(monday()));
        assert!(schedule.is_due(monday() + Duration::days(1)));
        assert!(schedule.is_due(monday() + Duration::days(6)));
    }

    #[test]
    fn empty_custom_days_fail_validation() {
        assert!(Schedule::CustomDays(WeekdaySet::EMPTY).validate().is_err());
        assert!(Schedule::Daily.validate().is_ok());
    }

    #[test]
    fn db_string_is_sorted_and_parses_back() {
        let set = WeekdaySet::from_weekdays([Weekday::Fri, Weekday::Mon, Weekday::Wed]);
        assert_eq!(set.to_db_string(), "0,2,4");
        assert_eq!(WeekdaySet::parse_db_string(" 4, 0 ,2,").unwrap(), set);
        assert!(WeekdaySet::parse_db_string("7").is_err());
        assert!(WeekdaySet::parse_db_string("").unwrap().is_empty());
    }

    #[test]
    fn from_db_rejects_unknown_type() {
        assert_eq!(Schedule::from_db("daily", ""), Some(Schedule::Daily));
        assert_eq!(Schedule::from_db("hourly", ""), None);
        assert_eq!(Schedule::from_db("custom", "x"), None);
    }

    #[test]
    fn serializes_custom_days_as_day_numbers() {
        let schedule =
            Schedule::CustomDays(WeekdaySet::from_weekdays([Weekday::Mon, Weekday::Sat]));
        let json = serde_json::to_value(schedule).unwrap();
        assert_eq!(json, serde_json::json!({"type": "custom_days", "days": [0, 5]}));
    }
}
