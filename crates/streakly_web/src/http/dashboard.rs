//! Dashboard page and check-in form handlers.

use super::{
    checkin_service, dashboard_service, parse_date, parse_habit_id, parse_optional_date,
    with_connection, PageError,
};
use crate::render;
use crate::AppState;
use axum::extract::{Query, State};
use axum::response::{Html, Redirect};
use axum::Form;
use chrono::{Local, NaiveDate};
use log::debug;
use serde::Deserialize;
use streakly_core::CheckInWrite;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DashboardQuery {
    date: Option<String>,
    month: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckInForm {
    habit_id: String,
    date: String,
    note: Option<String>,
    /// Absent means done; `false` keeps the record and its note as not done.
    completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UncheckForm {
    habit_id: String,
    date: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MarkAllForm {
    date: String,
}

pub(crate) async fn dashboard_page(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, PageError> {
    let now = Local::now().naive_local();
    let today = now.date();
    let date = parse_optional_date(query.date.as_deref())?.unwrap_or(today);
    let month_of = parse_optional_date(query.month.as_deref())?.unwrap_or(date);

    let (view, progress) = with_connection(&state, move |conn| {
        let dashboard = dashboard_service(conn)?;
        let view = dashboard.today_view(date, now)?;
        let progress = dashboard.month_progress(month_of, today)?;
        Ok((view, progress))
    })
    .await?;

    Ok(Html(render::dashboard::dashboard_page(&view, &progress, today)))
}

pub(crate) async fn check_in(
    State(state): State<AppState>,
    Form(form): Form<CheckInForm>,
) -> Result<Redirect, PageError> {
    let habit_id = parse_habit_id(&form.habit_id)?;
    let date = parse_date(&form.date)?;
    let completed = form.completed.unwrap_or(true);
    let write = CheckInWrite::new(habit_id, date, completed).with_note(form.note);

    with_connection(&state, move |conn| {
        checkin_service(conn)?.record(&write)?;
        Ok(())
    })
    .await?;

    debug!("event=web_check_in module=web status=ok date={date} completed={completed}");
    Ok(back_to(date))
}

pub(crate) async fn uncheck(
    State(state): State<AppState>,
    Form(form): Form<UncheckForm>,
) -> Result<Redirect, PageError> {
    let habit_id = parse_habit_id(&form.habit_id)?;
    let date = parse_date(&form.date)?;

    with_connection(&state, move |conn| checkin_service(conn)?.uncheck(habit_id, date)).await?;
    Ok(back_to(date))
}

pub(crate) async fn mark_all_done(
    State(state): State<AppState>,
    Form(form): Form<MarkAllForm>,
) -> Result<Redirect, PageError> {
    let date = parse_date(&form.date)?;

    let written =
        with_connection(&state, move |conn| checkin_service(conn)?.mark_all_done(date)).await?;
    debug!("event=web_mark_all module=web status=ok date={date} count={written}");
    Ok(back_to(date))
}

fn back_to(date: NaiveDate) -> Redirect {
    Redirect::to(&format!("/?date={date}"))
}
