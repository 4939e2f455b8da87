//! Habit management use-case service.
//!
//! # Responsibility
//! - Create habits and apply rename / schedule / description edits.
//! - Deactivate and reactivate habits instead of deleting them.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Missing habits surface as `ServiceError::HabitNotFound`.

use crate::model::habit::{Habit, HabitDraft, HabitId};
use crate::model::schedule::Schedule;
use crate::repo::habit_repo::{HabitListQuery, HabitRepository};
use crate::service::{ServiceError, ServiceResult};

/// Use-case service wrapper for habit lifecycle operations.
pub struct HabitService<R: HabitRepository> {
    repo: R,
}

impl<R: HabitRepository> HabitService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an active habit. Nothing is persisted when validation fails.
    pub fn create_habit(&self, draft: &HabitDraft) -> ServiceResult<Habit> {
        Ok(self.repo.create_habit(draft)?)
    }

    /// Replaces name, description and schedule in one write.
    pub fn update_habit(&self, id: HabitId, draft: &HabitDraft) -> ServiceResult<Habit> {
        Ok(self.repo.update_habit(id, draft)?)
    }

    pub fn rename_habit(&self, id: HabitId, name: &str) -> ServiceResult<Habit> {
        let habit = self.get_habit(id)?;
        let draft = HabitDraft::new(name, habit.schedule).with_description(habit.description);
        self.update_habit(id, &draft)
    }

    pub fn edit_schedule(&self, id: HabitId, schedule: Schedule) -> ServiceResult<Habit> {
        let habit = self.get_habit(id)?;
        let draft = HabitDraft::new(habit.name, schedule).with_description(habit.description);
        self.update_habit(id, &draft)
    }

    /// Hides the habit from today/progress views; history stays intact.
    pub fn deactivate_habit(&self, id: HabitId) -> ServiceResult<Habit> {
        Ok(self.repo.set_habit_active(id, false)?)
    }

    pub fn reactivate_habit(&self, id: HabitId) -> ServiceResult<Habit> {
        Ok(self.repo.set_habit_active(id, true)?)
    }

    /// Gets one habit (active or not).
    pub fn get_habit(&self, id: HabitId) -> ServiceResult<Habit> {
        self.repo
            .get_habit(id)?
            .ok_or(ServiceError::HabitNotFound(id))
    }

    /// Active habits in creation order.
    pub fn list_active_habits(&self) -> ServiceResult<Vec<Habit>> {
        Ok(self.repo.list_habits(&HabitListQuery::active())?)
    }

    /// Active and inactive habits in creation order.
    pub fn list_all_habits(&self) -> ServiceResult<Vec<Habit>> {
        Ok(self.repo.list_habits(&HabitListQuery::all())?)
    }
}
