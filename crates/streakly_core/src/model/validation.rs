//! Validation errors raised before any write reaches storage.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input rejected by domain invariants. Never fatal; callers show it inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Habit name is blank after trim.
    EmptyName,
    /// Custom schedule selected with no weekday.
    EmptyCustomDays,
    /// Reminder time is not a valid `HH:MM` value.
    InvalidReminderTime(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "habit name must not be empty"),
            Self::EmptyCustomDays => {
                write!(f, "custom schedule requires at least one weekday")
            }
            Self::InvalidReminderTime(value) => {
                write!(f, "reminder time `{value}` is not a valid HH:MM time")
            }
        }
    }
}

impl Error for ValidationError {}
