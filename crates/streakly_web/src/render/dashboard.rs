//! Dashboard page: reminder banner, due list, quick stats and month progress.

use super::{escape, layout, percent, plural};
use chrono::NaiveDate;
use streakly_core::{MonthProgress, TodayEntry, TodayView, DEFAULT_WINDOW_DAYS};

pub(crate) fn dashboard_page(view: &TodayView, progress: &MonthProgress, today: NaiveDate) -> String {
    let title = if view.date == today {
        format!("Today, {}", view.date.format("%a %Y-%m-%d"))
    } else {
        view.date.format("%a %Y-%m-%d").to_string()
    };

    let mut body = format!("<h1>{}</h1>", escape(&title));
    body.push_str(&date_picker(view.date, today));

    if let Some(banner) = &view.reminder {
        body.push_str(&format!(
            "<p class=\"banner\">It is past {}: {} still open today.</p>",
            banner.reminder_time,
            plural(banner.open_count, "habit is", "habits are")
        ));
    }

    if view.entries.is_empty() {
        body.push_str("<p>No active habits yet. <a href=\"/habits\">Create one</a> to get started.</p>");
    } else {
        body.push_str(&due_section(view));
        body.push_str(&not_due_section(view));
        body.push_str(&quick_stats_section(view));
    }
    body.push_str(&month_section(progress, view.date));

    layout(&title, &body)
}

fn date_picker(date: NaiveDate, today: NaiveDate) -> String {
    let mut html = format!(
        "<form method=\"get\" action=\"/\"><label>Date <input type=\"date\" name=\"date\" value=\"{date}\"></label> <button>Go</button></form>"
    );
    if date != today {
        html.push_str("<p><a href=\"/\">Back to today</a></p>");
    }
    html
}

fn due_section(view: &TodayView) -> String {
    let due = view.due_entries().collect::<Vec<_>>();
    if due.is_empty() {
        return "<h2>Due</h2><p class=\"muted\">Nothing is due on this date.</p>".to_string();
    }

    let mut html = format!(
        "<h2>Due</h2><p>{} of {} done.</p><table>",
        due.len() - view.open_count(),
        due.len()
    );
    for entry in due {
        html.push_str(&due_row(entry, view.date));
    }
    html.push_str("</table>");

    if view.open_count() > 0 {
        html.push_str(&format!(
            "<form method=\"post\" action=\"/checkins/all\"><input type=\"hidden\" name=\"date\" value=\"{}\"><button>Mark all done</button></form>",
            view.date
        ));
    }
    html
}

fn due_row(entry: &TodayEntry, date: NaiveDate) -> String {
    let id = entry.habit.id;
    let note = entry.note.as_deref().unwrap_or_default();
    let (status, submit) = if entry.is_completed {
        ("Done", "Save note")
    } else {
        ("Open", "Done")
    };

    let mut controls = format!(
        "<form method=\"post\" action=\"/checkins\" class=\"inline\">\
<input type=\"hidden\" name=\"habit_id\" value=\"{id}\"><input type=\"hidden\" name=\"date\" value=\"{date}\">\
<input name=\"note\" placeholder=\"Note\" value=\"{}\"> <button>{submit}</button></form>",
        escape(note)
    );
    if entry.is_completed {
        controls.push_str(&format!(
            " <form method=\"post\" action=\"/checkins\" class=\"inline\">\
<input type=\"hidden\" name=\"habit_id\" value=\"{id}\"><input type=\"hidden\" name=\"date\" value=\"{date}\">\
<input type=\"hidden\" name=\"note\" value=\"{}\"><input type=\"hidden\" name=\"completed\" value=\"false\">\
<button>Undo</button></form>",
            escape(note)
        ));
    } else if entry.note.is_some() {
        controls.push_str(&format!(
            " <form method=\"post\" action=\"/checkins/uncheck\" class=\"inline\">\
<input type=\"hidden\" name=\"habit_id\" value=\"{id}\"><input type=\"hidden\" name=\"date\" value=\"{date}\">\
<button>Clear</button></form>"
        ));
    }

    format!(
        "<tr><td><a href=\"/habits/{id}\">{}</a></td><td>{status}</td><td>{controls}</td></tr>",
        escape(&entry.habit.name)
    )
}

fn not_due_section(view: &TodayView) -> String {
    let names = view
        .entries
        .iter()
        .filter(|entry| !entry.is_due)
        .map(|entry| escape(&entry.habit.name))
        .collect::<Vec<_>>();
    if names.is_empty() {
        return String::new();
    }
    format!("<p class=\"muted\">Not due: {}</p>", names.join(", "))
}

fn quick_stats_section(view: &TodayView) -> String {
    if view.quick_stats.is_empty() {
        return String::new();
    }
    let mut html = format!(
        "<h2>Quick stats</h2><table><tr><th>Habit</th><th>Current streak</th><th>Best</th><th>{DEFAULT_WINDOW_DAYS}-day rate</th></tr>"
    );
    for quick in &view.quick_stats {
        html.push_str(&format!(
            "<tr><td><a href=\"/habits/{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>",
            quick.habit_id,
            escape(&quick.name),
            plural(quick.stats.current_streak as usize, "day", "days"),
            plural(quick.stats.best_streak as usize, "day", "days"),
            percent(quick.stats.success_rate)
        ));
    }
    html.push_str("</table>");
    html
}

fn month_section(progress: &MonthProgress, date: NaiveDate) -> String {
    let month_link = |target: Option<NaiveDate>, label: &str| {
        target
            .map(|month| format!("<a href=\"/?date={date}&amp;month={month}\">{label}</a>"))
            .unwrap_or_default()
    };

    let mut html = format!(
        "<h2>Month progress: {}</h2><p>{} {}</p><p>{} of {} due check-ins done ({}).</p>",
        progress.month_start.format("%B %Y"),
        month_link(progress.month_start.pred_opt(), "Previous month"),
        month_link(progress.month_end.succ_opt(), "Next month"),
        progress.total_done,
        progress.total_due,
        percent(progress.completion_rate)
    );

    html.push_str("<table><tr><th>Day</th><th>Done</th><th>Rate</th><th>Month to date</th></tr>");
    for day in &progress.days {
        if day.is_future {
            html.push_str(&format!(
                "<tr class=\"muted\"><td>{}</td><td colspan=\"3\">upcoming</td></tr>",
                day.date.format("%a %d")
            ));
            continue;
        }
        let width = (day.completion_rate * 100.0).clamp(0.0, 100.0);
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}/{}</td><td><div class=\"track\"><div class=\"bar\" style=\"width:{width:.0}%\"></div></div></td><td>{}/{}</td></tr>",
            day.date.format("%a %d"),
            day.done,
            day.due,
            day.cumulative_done,
            day.cumulative_due
        ));
    }
    html.push_str("</table>");
    html
}
