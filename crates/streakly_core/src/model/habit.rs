//! Habit domain model.
//!
//! # Responsibility
//! - Define the persisted habit record and its creation/edit input.
//! - Normalize user input before it reaches storage.
//!
//! # Invariants
//! - `id` is stable and never reused for another habit.
//! - `name` is trimmed and non-empty.
//! - `schedule` has at least one due weekday.
//! - `is_active == false` replaces hard deletion so history stays intact.

use crate::model::schedule::Schedule;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a habit.
pub type HabitId = Uuid;

/// Persisted habit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    /// Optional free text; empty when not provided.
    pub description: String,
    pub schedule: Schedule,
    pub is_active: bool,
    /// Unix epoch milliseconds. Defines list ordering.
    pub created_at: i64,
    /// Unix epoch milliseconds of the last edit.
    pub updated_at: i64,
}

impl Habit {
    /// Re-checks invariants on a record loaded from storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        self.schedule.validate()
    }
}

/// User-supplied fields for creating or editing a habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitDraft {
    pub name: String,
    pub description: String,
    pub schedule: Schedule,
}

impl HabitDraft {
    pub fn new(name: impl Into<String>, schedule: Schedule) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            schedule,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns a trimmed copy, or the first violated invariant.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        self.schedule.validate()?;
        Ok(Self {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            schedule: self.schedule,
        })
    }
}
