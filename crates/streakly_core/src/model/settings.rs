//! Application settings persisted in the `settings` table.

use crate::model::validation::ValidationError;
use chrono::NaiveTime;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Settings key for the daily reminder time.
pub const REMINDER_TIME_KEY: &str = "reminder_time";

/// Local time after which open habits trigger the reminder banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct ReminderTime(NaiveTime);

impl ReminderTime {
    /// Parses `HH:MM` (24-hour clock).
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .map(Self)
            .map_err(|_| ValidationError::InvalidReminderTime(trimmed.to_string()))
    }

    /// Like `parse`, but falls back to the default for malformed stored values.
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    pub fn time(self) -> NaiveTime {
        self.0
    }
}

impl Default for ReminderTime {
    fn default() -> Self {
        Self(NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN))
    }
}

impl Display for ReminderTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl From<ReminderTime> for String {
    fn from(value: ReminderTime) -> Self {
        value.to_string()
    }
}
