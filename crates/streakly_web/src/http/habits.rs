//! Habit management handlers: list, create, detail, edit, (de)activate.
//!
//! # Invariants
//! - Rejected create/edit submissions re-render the form with the user's
//!   input and nothing is persisted.

use super::{
    dashboard_service, habit_service, is_form_error, parse_habit_id, parse_optional_date,
    service_status, user_message, with_connection, PageError,
};
use crate::render;
use crate::render::habits::HabitFormValues;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use chrono::Local;
use serde::Deserialize;
use streakly_core::{
    weekday_from_number, Habit, HabitDetail, HabitDraft, HabitId, Schedule, ServiceError,
    WeekdaySet,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HabitForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    schedule: String,
    day_0: Option<String>,
    day_1: Option<String>,
    day_2: Option<String>,
    day_3: Option<String>,
    day_4: Option<String>,
    day_5: Option<String>,
    day_6: Option<String>,
}

impl HabitForm {
    fn custom_days(&self) -> WeekdaySet {
        let boxes = [
            &self.day_0,
            &self.day_1,
            &self.day_2,
            &self.day_3,
            &self.day_4,
            &self.day_5,
            &self.day_6,
        ];
        let mut days = WeekdaySet::EMPTY;
        for (number, checked) in (0u8..).zip(boxes) {
            if checked.is_some() {
                if let Some(day) = weekday_from_number(number) {
                    days.insert(day);
                }
            }
        }
        days
    }

    fn schedule(&self) -> Result<Schedule, PageError> {
        match self.schedule.trim() {
            "" | "daily" => Ok(Schedule::Daily),
            "weekdays" => Ok(Schedule::Weekdays),
            "custom" => Ok(Schedule::CustomDays(self.custom_days())),
            other => Err(PageError::BadRequest(format!("Unknown schedule `{other}`."))),
        }
    }

    fn to_draft(&self) -> Result<HabitDraft, PageError> {
        Ok(HabitDraft::new(self.name.clone(), self.schedule()?)
            .with_description(self.description.clone()))
    }

    fn values(&self) -> HabitFormValues {
        HabitFormValues {
            name: self.name.clone(),
            description: self.description.clone(),
            schedule_type: self.schedule.trim().to_string(),
            custom_days: self.custom_days(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DetailQuery {
    month: Option<String>,
}

/// Either the saved habit, or the rejection plus what the page needs to re-render.
enum Submission<T> {
    Saved(Habit),
    Rejected(ServiceError, T),
}

pub(crate) async fn habits_page(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let habits = with_connection(&state, |conn| habit_service(conn)?.list_all_habits()).await?;
    Ok(Html(render::habits::habits_page(
        &habits,
        &HabitFormValues::blank(),
        None,
    )))
}

pub(crate) async fn create_habit(
    State(state): State<AppState>,
    Form(form): Form<HabitForm>,
) -> Result<Response, PageError> {
    let draft = form.to_draft()?;

    let submission = with_connection(&state, move |conn| {
        let habits = habit_service(conn)?;
        match habits.create_habit(&draft) {
            Ok(habit) => Ok(Submission::Saved(habit)),
            Err(err) if is_form_error(&err) => {
                Ok(Submission::Rejected(err, habits.list_all_habits()?))
            }
            Err(err) => Err(err),
        }
    })
    .await?;

    match submission {
        Submission::Saved(habit) => Ok(Redirect::to(&format!("/habits/{}", habit.id)).into_response()),
        Submission::Rejected(err, habits) => {
            let message = user_message(&err);
            let page = render::habits::habits_page(&habits, &form.values(), Some(&message));
            Ok((service_status(&err), Html(page)).into_response())
        }
    }
}

pub(crate) async fn habit_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Result<Html<String>, PageError> {
    let habit_id = parse_habit_id(&id)?;
    let today = Local::now().date_naive();
    let month_of = parse_optional_date(query.month.as_deref())?.unwrap_or(today);

    let detail = with_connection(&state, move |conn| {
        dashboard_service(conn)?.habit_detail(habit_id, month_of, today)
    })
    .await?;

    let form = HabitFormValues::from_habit(&detail.habit);
    Ok(Html(render::habits::habit_page(&detail, &form, None)))
}

pub(crate) async fn update_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<HabitForm>,
) -> Result<Response, PageError> {
    let habit_id = parse_habit_id(&id)?;
    let draft = form.to_draft()?;
    let today = Local::now().date_naive();

    let submission = with_connection(&state, move |conn| {
        match habit_service(conn)?.update_habit(habit_id, &draft) {
            Ok(habit) => Ok(Submission::Saved(habit)),
            Err(err) if is_form_error(&err) => {
                let detail = dashboard_service(conn)?.habit_detail(habit_id, today, today)?;
                Ok(Submission::Rejected(err, detail))
            }
            Err(err) => Err(err),
        }
    })
    .await?;

    match submission {
        Submission::Saved(habit) => Ok(redirect_to_habit(habit.id).into_response()),
        Submission::Rejected(err, detail) => Ok(rejected_detail(&err, &detail, &form)),
    }
}

pub(crate) async fn deactivate_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, PageError> {
    let habit_id = parse_habit_id(&id)?;
    with_connection(&state, move |conn| habit_service(conn)?.deactivate_habit(habit_id)).await?;
    Ok(redirect_to_habit(habit_id))
}

pub(crate) async fn activate_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, PageError> {
    let habit_id = parse_habit_id(&id)?;
    with_connection(&state, move |conn| habit_service(conn)?.reactivate_habit(habit_id)).await?;
    Ok(redirect_to_habit(habit_id))
}

fn redirect_to_habit(habit_id: HabitId) -> Redirect {
    Redirect::to(&format!("/habits/{habit_id}"))
}

fn rejected_detail(err: &ServiceError, detail: &HabitDetail, form: &HabitForm) -> Response {
    let message = user_message(err);
    let page = render::habits::habit_page(detail, &form.values(), Some(&message));
    (service_status(err), Html(page)).into_response()
}
