//! HTML rendering for the server-side UI.
//!
//! # Invariants
//! - Every user-provided string goes through [`escape`] before it reaches markup.
//! - Pages are plain HTML forms; no script is required.

pub(crate) mod dashboard;
pub(crate) mod habits;
pub(crate) mod settings;

use axum::http::StatusCode;

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:56rem;margin:1.5rem auto;padding:0 1rem;color:#222}\
nav a{margin-right:1rem}\
table{border-collapse:collapse;margin:.5rem 0}\
td,th{padding:.25rem .5rem;text-align:left;border-bottom:1px solid #ddd}\
form.inline{display:inline}\
.banner{background:#fff3cd;border:1px solid #e0c060;padding:.5rem 1rem}\
.error{background:#fde2e1;border:1px solid #d9534f;padding:.5rem 1rem}\
.muted{color:#777}\
.bar{background:#4a9d5b;height:.8rem}\
.track{background:#eee;width:10rem}\
.cal td{width:2.5rem;height:2rem;text-align:center}\
.done{background:#b7e1c1}.missed{background:#f5c2c0}.open{background:#fff3cd}\
.not_due,.upcoming{color:#999}.outside_month{color:#ccc}";

/// Escapes text for HTML element content and quoted attribute values.
pub(crate) fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Wraps `body` in the shared page shell.
pub(crate) fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<title>{title} - Streakly</title><style>{STYLE}</style></head><body>\
<nav><a href=\"/\">Today</a><a href=\"/habits\">Habits</a><a href=\"/settings\">Settings</a></nav>\
{body}</body></html>",
        title = escape(title),
    )
}

pub(crate) fn error_page(status: StatusCode, message: &str) -> String {
    let heading = status.canonical_reason().unwrap_or("Error");
    layout(
        heading,
        &format!(
            "<h1>{}</h1><p class=\"error\">{}</p><p><a href=\"/\">Back to today</a></p>",
            escape(heading),
            escape(message)
        ),
    )
}

/// Inline error box, empty when there is nothing to report.
pub(crate) fn error_box(message: Option<&str>) -> String {
    message
        .map(|message| format!("<p class=\"error\">{}</p>", escape(message)))
        .unwrap_or_default()
}

/// Formats a `[0, 1]` ratio as a whole percentage.
pub(crate) fn percent(rate: f64) -> String {
    format!("{:.0}%", (rate * 100.0).clamp(0.0, 100.0))
}

pub(crate) fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}
