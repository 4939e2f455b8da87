//! JSON endpoints.

use super::{dashboard_service, parse_habit_id, parse_optional_date, with_connection, PageError};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use streakly_core::{HabitId, StatsSnapshot, StatsWindow, TodayView, DEFAULT_WINDOW_DAYS};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TodayQuery {
    date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatsQuery {
    from: Option<String>,
    to: Option<String>,
    as_of: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct HabitStatsBody {
    habit_id: HabitId,
    as_of: NaiveDate,
    window: StatsWindow,
    stats: StatsSnapshot,
}

/// JSON rendition of a [`PageError`].
pub(crate) struct ApiError(PageError);

impl From<PageError> for ApiError {
    fn from(value: PageError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        self.0.log();
        let body = Json(json!({
            "error": {
                "status": status.as_u16(),
                "message": self.0.public_message(),
            }
        }));
        (status, body).into_response()
    }
}

pub(crate) async fn today_json(
    State(state): State<AppState>,
    Query(query): Query<TodayQuery>,
) -> Result<Json<TodayView>, ApiError> {
    let now = Local::now().naive_local();
    let date = parse_optional_date(query.date.as_deref())?.unwrap_or(now.date());

    let view = with_connection(&state, move |conn| dashboard_service(conn)?.today_view(date, now))
        .await?;
    Ok(Json(view))
}

/// Stats for one habit over `from..=to`. The window defaults to the trailing
/// 28 days ending at `to`, and `to` defaults to `as_of`.
pub(crate) async fn habit_stats_json(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<HabitStatsBody>, ApiError> {
    let habit_id = parse_habit_id(&id)?;
    let as_of = parse_optional_date(query.as_of.as_deref())?
        .unwrap_or_else(|| Local::now().date_naive());
    let end = parse_optional_date(query.to.as_deref())?.unwrap_or(as_of);
    let window = match parse_optional_date(query.from.as_deref())? {
        Some(start) if start > end => {
            return Err(PageError::BadRequest(format!(
                "Window start {start} is after its end {end}."
            ))
            .into());
        }
        Some(start) => StatsWindow::new(start, end),
        None => StatsWindow::trailing(end, DEFAULT_WINDOW_DAYS),
    };

    let stats = with_connection(&state, move |conn| {
        dashboard_service(conn)?.habit_stats(habit_id, as_of, window)
    })
    .await?;
    Ok(Json(HabitStatsBody {
        habit_id,
        as_of,
        window,
        stats,
    }))
}

pub(crate) async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
