//! Check-in domain model.
//!
//! # Invariants
//! - One record per (habit, date); writes overwrite `completed` and `note`.
//! - `note` is trimmed; a blank note is stored as `None`.

use crate::model::habit::HabitId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persisted completion record for one habit on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub habit_id: HabitId,
    pub date: NaiveDate,
    pub completed: bool,
    pub note: Option<String>,
    /// Unix epoch milliseconds of the first write for this (habit, date).
    pub created_at: i64,
    /// Unix epoch milliseconds of the latest overwrite.
    pub updated_at: i64,
}

/// Upsert input for the check-in store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInWrite {
    pub habit_id: HabitId,
    pub date: NaiveDate,
    pub completed: bool,
    pub note: Option<String>,
}

impl CheckInWrite {
    pub fn new(habit_id: HabitId, date: NaiveDate, completed: bool) -> Self {
        Self {
            habit_id,
            date,
            completed,
            note: None,
        }
    }

    pub fn with_note(mut self, note: Option<impl Into<String>>) -> Self {
        self.note = note.map(Into::into);
        self
    }

    /// Note as it will be persisted.
    pub fn normalized_note(&self) -> Option<&str> {
        self.note
            .as_deref()
            .map(str::trim)
            .filter(|note| !note.is_empty())
    }
}

/// Storage form of a check-in date (`YYYY-MM-DD`).
pub fn date_to_db(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses the storage form of a check-in date.
pub fn parse_db_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::{date_to_db, parse_db_date, CheckInWrite};
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn blank_note_normalizes_to_none() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let write = CheckInWrite::new(Uuid::new_v4(), date, true).with_note(Some("   "));
        assert_eq!(write.normalized_note(), None);

        let write = write.with_note(Some(" felt good "));
        assert_eq!(write.normalized_note(), Some("felt good"));
    }

    #[test]
    fn db_dates_are_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(date_to_db(date), "2024-01-02");
        assert_eq!(parse_db_date("2024-01-02"), Some(date));
        assert_eq!(parse_db_date("2024-1-2x"), None);
    }
}
