//! Settings handlers.

use super::{dashboard_service, is_form_error, service_status, user_message, with_connection, PageError};
use crate::render;
use crate::AppState;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SettingsQuery {
    saved: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SettingsForm {
    #[serde(default)]
    reminder_time: String,
}

pub(crate) async fn settings_page(
    State(state): State<AppState>,
    Query(query): Query<SettingsQuery>,
) -> Result<Html<String>, PageError> {
    let reminder = with_connection(&state, |conn| dashboard_service(conn)?.reminder_time()).await?;
    Ok(Html(render::settings::settings_page(
        &reminder.to_string(),
        query.saved.is_some(),
        None,
    )))
}

pub(crate) async fn save_settings(
    State(state): State<AppState>,
    Form(form): Form<SettingsForm>,
) -> Result<Response, PageError> {
    let value = form.reminder_time.clone();
    let outcome = with_connection(&state, move |conn| {
        match dashboard_service(conn)?.set_reminder_time(&value) {
            Ok(_) => Ok(None),
            Err(err) if is_form_error(&err) => Ok(Some(err)),
            Err(err) => Err(err),
        }
    })
    .await?;

    match outcome {
        None => Ok(Redirect::to("/settings?saved=1").into_response()),
        Some(err) => {
            let message = user_message(&err);
            let page =
                render::settings::settings_page(&form.reminder_time, false, Some(&message));
            Ok((service_status(&err), Html(page)).into_response())
        }
    }
}
