//! Habit tracking domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep schedule rules as a closed variant so every caller handles each case.
//!
//! # Invariants
//! - Every habit is identified by a stable `HabitId`.
//! - Habits are deactivated, never hard-deleted.
//! - At most one check-in exists per (habit, date).

pub mod checkin;
pub mod habit;
pub mod schedule;
pub mod settings;
pub mod validation;
