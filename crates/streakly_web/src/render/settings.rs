//! Settings page.

use super::{error_box, escape, layout};

pub(crate) fn settings_page(reminder_time: &str, saved: bool, error: Option<&str>) -> String {
    let mut body = String::from("<h1>Settings</h1>");
    if saved {
        body.push_str("<p class=\"banner\">Settings saved.</p>");
    }
    body.push_str(&error_box(error));
    body.push_str(&format!(
        "<form method=\"post\" action=\"/settings\">\
<p><label>Daily reminder after <input type=\"time\" name=\"reminder_time\" value=\"{}\"></label></p>\
<p class=\"muted\">The dashboard shows a reminder when habits are still open after this time.</p>\
<p><button>Save</button></p></form>",
        escape(reminder_time)
    ));
    layout("Settings", &body)
}
