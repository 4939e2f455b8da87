//! HTTP routing and the request plumbing shared by all handlers.
//!
//! # Responsibility
//! - Map routes to page, form and JSON handlers.
//! - Run storage work on a blocking thread with a per-request connection.
//! - Translate service errors into status codes and an HTML error page.
//!
//! # Invariants
//! - Validation errors map to 422, missing habits to 404, duplicate names
//!   to 409, storage failures to 500.
//! - Storage failure details are logged, never rendered.

mod api;
mod dashboard;
mod habits;
mod settings;

use crate::render;
use crate::AppState;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::{Datelike, NaiveDate};
use log::{error, warn};
use rusqlite::Connection;
use std::fmt::{Display, Formatter};
use streakly_core::db::open_db;
use streakly_core::{
    CheckInService, DashboardService, HabitId, HabitService, ServiceError, ServiceResult,
    SqliteCheckInRepository, SqliteHabitRepository, SqliteSettingsRepository,
};
use uuid::Uuid;

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::dashboard_page))
        .route("/checkins", post(dashboard::check_in))
        .route("/checkins/uncheck", post(dashboard::uncheck))
        .route("/checkins/all", post(dashboard::mark_all_done))
        .route(
            "/habits",
            get(habits::habits_page).post(habits::create_habit),
        )
        .route(
            "/habits/:id",
            get(habits::habit_page).post(habits::update_habit),
        )
        .route("/habits/:id/deactivate", post(habits::deactivate_habit))
        .route("/habits/:id/activate", post(habits::activate_habit))
        .route(
            "/settings",
            get(settings::settings_page).post(settings::save_settings),
        )
        .route("/api/today", get(api::today_json))
        .route("/api/habits/:id/stats", get(api::habit_stats_json))
        .route("/healthz", get(api::healthz))
        .with_state(state)
}

/// Request-level failure rendered as an error page.
#[derive(Debug)]
pub(crate) enum PageError {
    Service(ServiceError),
    BadRequest(String),
    Internal(String),
}

impl PageError {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::Service(err) => service_status(err),
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text safe to show to the user.
    pub(crate) fn public_message(&self) -> String {
        match self {
            Self::Service(err) if err.is_user_error() => user_message(err),
            Self::BadRequest(message) => message.clone(),
            Self::Service(_) | Self::Internal(_) => {
                "The habit database could not be read or written. Check the server log.".to_string()
            }
        }
    }

    pub(crate) fn log(&self) {
        let status = self.status();
        if status.is_server_error() {
            error!(
                "event=request_failed module=web status=error code={} error={}",
                status.as_u16(),
                self
            );
        } else {
            warn!(
                "event=request_rejected module=web status=error code={}",
                status.as_u16()
            );
        }
    }
}

impl Display for PageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::BadRequest(message) => write!(f, "bad request: {message}"),
            Self::Internal(message) => write!(f, "internal error: {message}"),
        }
    }
}

impl From<ServiceError> for PageError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        let body = render::error_page(status, &self.public_message());
        (status, Html(body)).into_response()
    }
}

pub(crate) fn service_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::HabitNotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::DuplicateName(_) => StatusCode::CONFLICT,
        ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Message for errors the user can fix from the form.
pub(crate) fn user_message(err: &ServiceError) -> String {
    match err {
        ServiceError::HabitNotFound(_) => "That habit does not exist.".to_string(),
        ServiceError::DuplicateName(name) => {
            format!("A habit named \"{name}\" already exists.")
        }
        other => {
            let text = other.to_string();
            let mut chars = text.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>() + ".",
                None => text,
            }
        }
    }
}

/// Whether a failed form submission should re-render the form inline.
pub(crate) fn is_form_error(err: &ServiceError) -> bool {
    matches!(
        err,
        ServiceError::Validation(_) | ServiceError::DuplicateName(_)
    )
}

/// Runs `op` on a blocking worker with a freshly opened connection.
pub(crate) async fn with_connection<T, F>(state: &AppState, op: F) -> Result<T, PageError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> ServiceResult<T> + Send + 'static,
{
    let db_path = state.db_path().to_path_buf();
    let outcome = tokio::task::spawn_blocking(move || {
        let conn = open_db(&db_path)?;
        op(&conn)
    })
    .await
    .map_err(|err| PageError::Internal(format!("blocking task failed: {err}")))?;
    outcome.map_err(PageError::from)
}

pub(crate) type SqliteHabitService<'conn> = HabitService<SqliteHabitRepository<'conn>>;
pub(crate) type SqliteCheckInService<'conn> =
    CheckInService<SqliteHabitRepository<'conn>, SqliteCheckInRepository<'conn>>;
pub(crate) type SqliteDashboardService<'conn> = DashboardService<
    SqliteHabitRepository<'conn>,
    SqliteCheckInRepository<'conn>,
    SqliteSettingsRepository<'conn>,
>;

pub(crate) fn habit_service(conn: &Connection) -> ServiceResult<SqliteHabitService<'_>> {
    Ok(HabitService::new(SqliteHabitRepository::try_new(conn)?))
}

pub(crate) fn checkin_service(conn: &Connection) -> ServiceResult<SqliteCheckInService<'_>> {
    Ok(CheckInService::new(
        SqliteHabitRepository::try_new(conn)?,
        SqliteCheckInRepository::try_new(conn)?,
    ))
}

pub(crate) fn dashboard_service(conn: &Connection) -> ServiceResult<SqliteDashboardService<'_>> {
    Ok(DashboardService::new(
        SqliteHabitRepository::try_new(conn)?,
        SqliteCheckInRepository::try_new(conn)?,
        SqliteSettingsRepository::try_new(conn)?,
    ))
}

/// Parses a `YYYY-MM-DD` query or form value; blank means absent.
pub(crate) fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>, PageError> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_date(raw).map(Some),
    }
}

/// Accepted calendar years for dates coming from requests.
const DATE_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, PageError> {
    let invalid = || PageError::BadRequest(format!("Invalid date `{raw}`; expected YYYY-MM-DD."));
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
    if !DATE_YEARS.contains(&date.year()) {
        return Err(invalid());
    }
    Ok(date)
}

pub(crate) fn parse_habit_id(raw: &str) -> Result<HabitId, PageError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| PageError::BadRequest(format!("Invalid habit id `{raw}`.")))
}

#[cfg(test)]
mod tests {
    use super::{parse_date, parse_optional_date, service_status, user_message, PageError};
    use axum::http::StatusCode;
    use chrono::NaiveDate;
    use streakly_core::{ServiceError, ValidationError};
    use uuid::Uuid;

    #[test]
    fn service_errors_map_to_documented_statuses() {
        assert_eq!(
            service_status(&ServiceError::Validation(ValidationError::EmptyName)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            service_status(&ServiceError::HabitNotFound(Uuid::nil())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            service_status(&ServiceError::DuplicateName("Read".to_string())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn blank_dates_are_absent_and_malformed_dates_are_rejected() {
        assert_eq!(parse_optional_date(None).unwrap(), None);
        assert_eq!(parse_optional_date(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_optional_date(Some("2024-07-08")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 8)
        );
        let err = parse_optional_date(Some("08/07/2024")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn dates_outside_four_digit_years_are_rejected() {
        for raw in ["-262143-01-01", "0000-12-31", "+10000-01-01", "262142-12-31"] {
            let err = parse_date(raw).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "{raw}");
        }
        assert_eq!(parse_date("0001-01-01").unwrap(), NaiveDate::from_ymd_opt(1, 1, 1).unwrap());
        assert_eq!(
            parse_date("9999-12-31").unwrap(),
            NaiveDate::from_ymd_opt(9999, 12, 31).unwrap()
        );
    }

    #[test]
    fn storage_details_are_not_shown_to_users() {
        let err = PageError::Internal("disk I/O error at /secret/path".to_string());
        assert!(!err.public_message().contains("/secret/path"));
        assert!(user_message(&ServiceError::DuplicateName("Read".to_string())).contains("Read"));
    }
}
