//! Habit management list, habit detail page and the shared habit form.

use super::{error_box, escape, layout, percent, plural};
use chrono::{Datelike, NaiveDate};
use streakly_core::{
    weekday_from_number, CellStatus, Habit, HabitCalendar, HabitDetail, Schedule, WeekdaySet,
    WEEKDAY_LABELS,
};

/// Values echoed back into the habit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HabitFormValues {
    pub(crate) name: String,
    pub(crate) description: String,
    /// `daily`, `weekdays` or `custom`.
    pub(crate) schedule_type: String,
    pub(crate) custom_days: WeekdaySet,
}

impl HabitFormValues {
    pub(crate) fn blank() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            schedule_type: Schedule::Daily.type_name().to_string(),
            custom_days: WeekdaySet::EMPTY,
        }
    }

    pub(crate) fn from_habit(habit: &Habit) -> Self {
        let custom_days = match habit.schedule {
            Schedule::CustomDays(days) => days,
            Schedule::Daily | Schedule::Weekdays => WeekdaySet::EMPTY,
        };
        Self {
            name: habit.name.clone(),
            description: habit.description.clone(),
            schedule_type: habit.schedule.type_name().to_string(),
            custom_days,
        }
    }
}

pub(crate) fn habits_page(habits: &[Habit], form: &HabitFormValues, error: Option<&str>) -> String {
    let mut body = String::from("<h1>Habits</h1>");

    if habits.is_empty() {
        body.push_str("<p class=\"muted\">No habits yet.</p>");
    } else {
        body.push_str("<table><tr><th>Name</th><th>Schedule</th><th>Status</th><th></th></tr>");
        for habit in habits {
            body.push_str(&format!(
                "<tr><td><a href=\"/habits/{id}\">{name}</a></td><td>{schedule}</td><td>{status}</td><td>{toggle}</td></tr>",
                id = habit.id,
                name = escape(&habit.name),
                schedule = escape(&habit.schedule.describe()),
                status = if habit.is_active { "Active" } else { "Inactive" },
                toggle = active_toggle(habit),
            ));
        }
        body.push_str("</table>");
    }

    body.push_str("<h2>New habit</h2>");
    body.push_str(&error_box(error));
    body.push_str(&habit_form("/habits", form, "Create habit"));
    layout("Habits", &body)
}

pub(crate) fn habit_page(detail: &HabitDetail, form: &HabitFormValues, error: Option<&str>) -> String {
    let habit = &detail.habit;
    let stats = &detail.stats;

    let mut body = format!("<h1>{}</h1>", escape(&habit.name));
    if !habit.description.is_empty() {
        body.push_str(&format!("<p>{}</p>", escape(&habit.description)));
    }
    body.push_str(&format!(
        "<p>{}{}</p>",
        escape(&habit.schedule.describe()),
        if habit.is_active { "" } else { " (inactive)" }
    ));

    body.push_str(&format!(
        "<table><tr><th>Current streak</th><td>{}</td></tr><tr><th>Best streak</th><td>{}</td></tr>\
<tr><th>Success rate</th><td>{} ({} of {} due days, {} to {})</td></tr></table>",
        plural(stats.current_streak as usize, "day", "days"),
        plural(stats.best_streak as usize, "day", "days"),
        percent(stats.success_rate),
        stats.completed_due_days,
        stats.total_due_days,
        detail.window.start,
        detail.window.end.min(detail.as_of),
    ));

    body.push_str(&calendar_section(habit, &detail.calendar));
    body.push_str(&recent_section(detail));

    body.push_str("<h2>Edit</h2>");
    body.push_str(&error_box(error));
    body.push_str(&habit_form(&format!("/habits/{}", habit.id), form, "Save changes"));
    body.push_str(&format!("<p>{}</p>", active_toggle(habit)));

    layout(&habit.name, &body)
}

fn active_toggle(habit: &Habit) -> String {
    let (action, label) = if habit.is_active {
        ("deactivate", "Deactivate")
    } else {
        ("activate", "Activate")
    };
    format!(
        "<form method=\"post\" action=\"/habits/{}/{action}\" class=\"inline\"><button>{label}</button></form>",
        habit.id
    )
}

fn habit_form(action: &str, values: &HabitFormValues, submit: &str) -> String {
    let schedule_option = |value: &str, label: &str| {
        let selected = if values.schedule_type == value {
            " selected"
        } else {
            ""
        };
        format!("<option value=\"{value}\"{selected}>{label}</option>")
    };

    let day_boxes = WEEKDAY_LABELS
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let checked = weekday_from_number(index as u8)
                .is_some_and(|day| values.custom_days.contains(day));
            format!(
                "<label><input type=\"checkbox\" name=\"day_{index}\" value=\"on\"{}> {label}</label> ",
                if checked { " checked" } else { "" }
            )
        })
        .collect::<String>();

    format!(
        "<form method=\"post\" action=\"{action}\">\
<p><label>Name <input name=\"name\" value=\"{name}\" required></label></p>\
<p><label>Description <input name=\"description\" value=\"{description}\"></label></p>\
<p><label>Schedule <select name=\"schedule\">{daily}{weekdays}{custom}</select></label></p>\
<p>Custom days: {day_boxes}</p>\
<p><button>{submit}</button></p></form>",
        action = escape(action),
        name = escape(&values.name),
        description = escape(&values.description),
        daily = schedule_option("daily", "Every day"),
        weekdays = schedule_option("weekdays", "Weekdays (Mon-Fri)"),
        custom = schedule_option("custom", "Custom days"),
    )
}

fn calendar_section(habit: &Habit, calendar: &HabitCalendar) -> String {
    let month_link = |target: Option<NaiveDate>, label: &str| {
        target
            .map(|month| format!("<a href=\"/habits/{}?month={month}\">{label}</a>", habit.id))
            .unwrap_or_default()
    };

    let mut html = format!(
        "<h2>{}</h2><p>{} {}</p><table class=\"cal\"><tr>",
        calendar.month_start.format("%B %Y"),
        month_link(calendar.month_start.pred_opt(), "Previous month"),
        month_link(calendar.month_end.succ_opt(), "Next month"),
    );
    for label in WEEKDAY_LABELS {
        html.push_str(&format!("<th>{label}</th>"));
    }
    html.push_str("</tr>");

    for week in &calendar.weeks {
        html.push_str("<tr>");
        for cell in week {
            let day = if cell.status == CellStatus::OutsideMonth {
                String::new()
            } else {
                cell.date.day().to_string()
            };
            html.push_str(&format!(
                "<td class=\"{}\" title=\"{}\">{day}</td>",
                cell_class(cell.status),
                cell.date
            ));
        }
        html.push_str("</tr>");
    }
    html.push_str("</table>");
    html
}

fn cell_class(status: CellStatus) -> &'static str {
    match status {
        CellStatus::OutsideMonth => "outside_month",
        CellStatus::NotDue => "not_due",
        CellStatus::Done => "done",
        CellStatus::Missed => "missed",
        CellStatus::Open => "open",
        CellStatus::Upcoming => "upcoming",
    }
}

fn recent_section(detail: &HabitDetail) -> String {
    if detail.recent.is_empty() {
        return "<h2>Recent check-ins</h2><p class=\"muted\">No check-ins in the last two weeks.</p>"
            .to_string();
    }
    let mut html = String::from("<h2>Recent check-ins</h2><table>");
    for check_in in &detail.recent {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            check_in.date,
            if check_in.completed { "Done" } else { "Not done" },
            escape(check_in.note.as_deref().unwrap_or_default())
        ));
    }
    html.push_str("</table>");
    html
}
