//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the web layer decoupled from storage details.
//! - Map persistence failures onto the user-facing error kinds
//!   (validation, not found, storage).

use crate::db::DbError;
use crate::model::habit::HabitId;
use crate::model::validation::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod checkin_service;
pub mod dashboard_service;
pub mod habit_service;
pub mod today;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by use-case services.
#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before persistence; shown inline.
    Validation(ValidationError),
    /// Operation referenced a habit that does not exist.
    HabitNotFound(HabitId),
    /// Another habit already uses this name.
    DuplicateName(String),
    /// Storage failure (file unavailable, corruption, schema mismatch).
    Storage(RepoError),
}

impl ServiceError {
    /// Whether the user can fix this by changing their input.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::HabitNotFound(id) => write!(f, "habit not found: {id}"),
            Self::DuplicateName(name) => write!(f, "a habit named `{name}` already exists"),
            Self::Storage(err) => write!(f, "storage error: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::HabitNotFound(_) | Self::DuplicateName(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::HabitNotFound(id),
            RepoError::DuplicateName(name) => Self::DuplicateName(name),
            other => Self::Storage(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        Self::Storage(RepoError::Db(value))
    }
}
