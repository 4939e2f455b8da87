use std::net::SocketAddr;
use std::path::Path;

use chrono::{Local, NaiveDate};
use streakly_core::db::open_db;
use streakly_core::{
    CheckInRepository, HabitDraft, HabitListQuery, HabitRepository, Schedule,
    SqliteCheckInRepository, SqliteHabitRepository,
};
use streakly_web::{build_router, AppState};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

struct Response {
    status: u16,
    head: String,
    body: String,
}

async fn spawn_app(db_path: &Path) -> SocketAddr {
    let app = build_router(AppState::new(db_path));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

async fn send_raw(addr: SocketAddr, request: String) -> Response {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    stream
        .write_all(request.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("status");
    Response {
        status,
        head: head.to_string(),
        body: body.to_string(),
    }
}

async fn get(addr: SocketAddr, path: &str) -> Response {
    send_raw(
        addr,
        format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n"),
    )
    .await
}

async fn post_form(addr: SocketAddr, path: &str, body: &str) -> Response {
    send_raw(
        addr,
        format!(
            "POST {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\
Content-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        ),
    )
    .await
}

fn location(response: &Response) -> Option<String> {
    response.head.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.eq_ignore_ascii_case("location")
            .then(|| value.trim().to_string())
    })
}

fn list_habit_names(db_path: &Path) -> Vec<String> {
    let conn = open_db(db_path).expect("open db");
    SqliteHabitRepository::try_new(&conn)
        .expect("repo")
        .list_habits(&HabitListQuery::all())
        .expect("list")
        .into_iter()
        .map(|habit| habit.name)
        .collect()
}

fn temp_db() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data").join("habits.db");
    (dir, path)
}

#[tokio::test]
async fn healthz_and_empty_dashboard_render() {
    let (_dir, db_path) = temp_db();
    let addr = spawn_app(&db_path).await;

    let health = get(addr, "/healthz").await;
    assert_eq!(health.status, 200);
    assert_eq!(health.body, "ok");

    let page = get(addr, "/").await;
    assert_eq!(page.status, 200);
    assert!(page.head.to_ascii_lowercase().contains("text/html"));
    assert!(page.body.contains("No active habits yet"));
    assert!(db_path.exists());
}

#[tokio::test]
async fn creating_a_habit_redirects_to_its_detail_page() {
    let (_dir, db_path) = temp_db();
    let addr = spawn_app(&db_path).await;

    let created = post_form(
        addr,
        "/habits",
        "name=Exercise&description=30+minutes&schedule=custom&day_0=on&day_2=on&day_4=on",
    )
    .await;
    assert_eq!(created.status, 303);
    let target = location(&created).expect("location header");
    assert!(target.starts_with("/habits/"));

    let detail = get(addr, &target).await;
    assert_eq!(detail.status, 200);
    assert!(detail.body.contains("<h1>Exercise</h1>"));
    assert!(detail.body.contains("30 minutes"));
    assert!(detail.body.contains("Mon, Wed, Fri"));
    assert_eq!(list_habit_names(&db_path), vec!["Exercise".to_string()]);
}

#[tokio::test]
async fn invalid_habit_forms_rerender_inline_without_persisting() {
    let (_dir, db_path) = temp_db();
    let addr = spawn_app(&db_path).await;

    let no_days = post_form(addr, "/habits", "name=Swim&schedule=custom").await;
    assert_eq!(no_days.status, 422);
    assert!(no_days.body.contains("class=\"error\""));
    assert!(no_days.body.contains("at least one weekday"));
    assert!(no_days.body.contains("value=\"Swim\""));

    let blank = post_form(addr, "/habits", "name=+++&schedule=daily").await;
    assert_eq!(blank.status, 422);

    assert!(list_habit_names(&db_path).is_empty());

    post_form(addr, "/habits", "name=Read&schedule=daily").await;
    let duplicate = post_form(addr, "/habits", "name=Read&schedule=weekdays").await;
    assert_eq!(duplicate.status, 409);
    assert!(duplicate.body.contains("already exists"));
    assert_eq!(list_habit_names(&db_path), vec!["Read".to_string()]);
}

#[tokio::test]
async fn check_in_flow_updates_dashboard_and_store() {
    let (_dir, db_path) = temp_db();
    let habit = {
        let conn = open_db(&db_path).expect("open db");
        SqliteHabitRepository::try_new(&conn)
            .expect("repo")
            .create_habit(&HabitDraft::new("Read", Schedule::Daily))
            .expect("create")
    };
    let addr = spawn_app(&db_path).await;
    let date = NaiveDate::from_ymd_opt(2024, 7, 8).expect("date");

    let checked = post_form(
        addr,
        "/checkins",
        &format!("habit_id={}&date={date}&note=chapter+3", habit.id),
    )
    .await;
    assert_eq!(checked.status, 303);
    assert_eq!(location(&checked).as_deref(), Some("/?date=2024-07-08"));

    let page = get(addr, "/?date=2024-07-08").await;
    assert_eq!(page.status, 200);
    assert!(page.body.contains("1 of 1 done."));
    assert!(page.body.contains("value=\"chapter 3\""));

    let stored = {
        let conn = open_db(&db_path).expect("open db");
        SqliteCheckInRepository::try_new(&conn)
            .expect("repo")
            .get_check_in(habit.id, date)
            .expect("get")
            .expect("check-in exists")
    };
    assert!(stored.completed);
    assert_eq!(stored.note.as_deref(), Some("chapter 3"));

    assert!(page.body.contains("name=\"completed\" value=\"false\""));

    let undone = post_form(
        addr,
        "/checkins",
        &format!("habit_id={}&date={date}&note=chapter+3&completed=false", habit.id),
    )
    .await;
    assert_eq!(undone.status, 303);
    let page = get(addr, "/?date=2024-07-08").await;
    assert!(page.body.contains("0 of 1 done."));
    assert!(page.body.contains("value=\"chapter 3\""));
    assert!(page.body.contains("Clear"));
    let kept = {
        let conn = open_db(&db_path).expect("open db");
        SqliteCheckInRepository::try_new(&conn)
            .expect("repo")
            .get_check_in(habit.id, date)
            .expect("get")
            .expect("check-in kept")
    };
    assert!(!kept.completed);
    assert_eq!(kept.note.as_deref(), Some("chapter 3"));

    let cleared = post_form(
        addr,
        "/checkins/uncheck",
        &format!("habit_id={}&date={date}", habit.id),
    )
    .await;
    assert_eq!(cleared.status, 303);
    let page = get(addr, "/?date=2024-07-08").await;
    assert!(page.body.contains("0 of 1 done."));
    assert!(page.body.contains("Mark all done"));
    assert!(!page.body.contains("value=\"chapter 3\""));
}

#[tokio::test]
async fn mark_all_done_and_json_today_view() {
    let (_dir, db_path) = temp_db();
    {
        let conn = open_db(&db_path).expect("open db");
        let repo = SqliteHabitRepository::try_new(&conn).expect("repo");
        repo.create_habit(&HabitDraft::new("Read", Schedule::Daily))
            .expect("create");
        repo.create_habit(&HabitDraft::new("Stretch", Schedule::Daily))
            .expect("create");
    }
    let addr = spawn_app(&db_path).await;

    let marked = post_form(addr, "/checkins/all", "date=2024-07-08").await;
    assert_eq!(marked.status, 303);

    let json = get(addr, "/api/today?date=2024-07-08").await;
    assert_eq!(json.status, 200);
    let view: serde_json::Value = serde_json::from_str(&json.body).expect("json body");
    let entries = view["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["habit"]["name"], "Read");
    assert!(entries
        .iter()
        .all(|entry| entry["is_completed"] == serde_json::Value::Bool(true)));
}

#[tokio::test]
async fn unknown_habits_and_bad_input_map_to_error_statuses() {
    let (_dir, db_path) = temp_db();
    let addr = spawn_app(&db_path).await;

    let missing = get(addr, "/habits/00000000-0000-4000-8000-000000000000").await;
    assert_eq!(missing.status, 404);
    assert!(missing.body.contains("does not exist"));

    let malformed = get(addr, "/habits/not-a-uuid").await;
    assert_eq!(malformed.status, 400);

    let bad_date = get(addr, "/api/today?date=yesterday").await;
    assert_eq!(bad_date.status, 400);
    let error: serde_json::Value = serde_json::from_str(&bad_date.body).expect("json body");
    assert_eq!(error["error"]["status"], 400);

    let check_unknown = post_form(
        addr,
        "/checkins",
        "habit_id=00000000-0000-4000-8000-000000000000&date=2024-07-08",
    )
    .await;
    assert_eq!(check_unknown.status, 404);
}

#[tokio::test]
async fn deactivated_habits_leave_the_dashboard_but_stay_listed() {
    let (_dir, db_path) = temp_db();
    let habit = {
        let conn = open_db(&db_path).expect("open db");
        SqliteHabitRepository::try_new(&conn)
            .expect("repo")
            .create_habit(&HabitDraft::new("Guitar", Schedule::Daily))
            .expect("create")
    };
    let addr = spawn_app(&db_path).await;

    let deactivated = post_form(addr, &format!("/habits/{}/deactivate", habit.id), "").await;
    assert_eq!(deactivated.status, 303);

    let today = Local::now().date_naive();
    let dashboard = get(addr, &format!("/?date={today}")).await;
    assert!(dashboard.body.contains("No active habits yet"));

    let list = get(addr, "/habits").await;
    assert!(list.body.contains("Guitar"));
    assert!(list.body.contains("Inactive"));

    let activated = post_form(addr, &format!("/habits/{}/activate", habit.id), "").await;
    assert_eq!(activated.status, 303);
    let dashboard = get(addr, &format!("/?date={today}")).await;
    assert!(dashboard.body.contains("Guitar"));
}

#[tokio::test]
async fn editing_a_habit_validates_and_saves() {
    let (_dir, db_path) = temp_db();
    let habit = {
        let conn = open_db(&db_path).expect("open db");
        SqliteHabitRepository::try_new(&conn)
            .expect("repo")
            .create_habit(&HabitDraft::new("Walk", Schedule::Daily))
            .expect("create")
    };
    let addr = spawn_app(&db_path).await;
    let path = format!("/habits/{}", habit.id);

    let rejected = post_form(addr, &path, "name=&schedule=weekdays").await;
    assert_eq!(rejected.status, 422);
    assert_eq!(list_habit_names(&db_path), vec!["Walk".to_string()]);

    let saved = post_form(addr, &path, "name=Evening+walk&schedule=weekdays").await;
    assert_eq!(saved.status, 303);
    let detail = get(addr, &path).await;
    assert!(detail.body.contains("<h1>Evening walk</h1>"));
    assert!(detail.body.contains("Weekdays (Mon-Fri)"));
}

#[tokio::test]
async fn settings_store_reminder_time() {
    let (_dir, db_path) = temp_db();
    let addr = spawn_app(&db_path).await;

    let page = get(addr, "/settings").await;
    assert_eq!(page.status, 200);
    assert!(page.body.contains("value=\"18:00\""));

    let invalid = post_form(addr, "/settings", "reminder_time=25%3A99").await;
    assert_eq!(invalid.status, 422);
    assert!(invalid.body.contains("not a valid HH:MM time"));

    let saved = post_form(addr, "/settings", "reminder_time=07%3A45").await;
    assert_eq!(saved.status, 303);
    let page = get(addr, "/settings?saved=1").await;
    assert!(page.body.contains("value=\"07:45\""));
    assert!(page.body.contains("Settings saved."));
}

#[tokio::test]
async fn out_of_range_dates_are_rejected_as_bad_requests() {
    let (_dir, db_path) = temp_db();
    let habit = {
        let conn = open_db(&db_path).expect("open db");
        SqliteHabitRepository::try_new(&conn)
            .expect("repo")
            .create_habit(&HabitDraft::new("Read", Schedule::Daily))
            .expect("create")
    };
    let addr = spawn_app(&db_path).await;

    for path in [
        "/?date=-262143-01-01".to_string(),
        "/?month=0000-06-01".to_string(),
        "/api/today?date=-262143-01-01".to_string(),
        format!("/habits/{}?month=-262143-01-01", habit.id),
        format!("/api/habits/{}/stats?as_of=-262143-01-01", habit.id),
    ] {
        let response = get(addr, &path).await;
        assert_eq!(response.status, 400, "{path}");
    }

    let check = post_form(
        addr,
        "/checkins",
        &format!("habit_id={}&date=-262143-01-01", habit.id),
    )
    .await;
    assert_eq!(check.status, 400);

    let far = get(addr, "/?date=9999-12-31").await;
    assert_eq!(far.status, 200);
}

#[tokio::test]
async fn habit_stats_json_reports_streaks_for_a_window() {
    let (_dir, db_path) = temp_db();
    let habit = {
        let conn = open_db(&db_path).expect("open db");
        let habit = SqliteHabitRepository::try_new(&conn)
            .expect("repo")
            .create_habit(&HabitDraft::new("Read", Schedule::Daily))
            .expect("create");
        let check_ins = SqliteCheckInRepository::try_new(&conn).expect("repo");
        for day in [1, 2, 4, 5] {
            let date = NaiveDate::from_ymd_opt(2024, 7, day).expect("date");
            check_ins
                .upsert_check_in(&streakly_core::CheckInWrite::new(habit.id, date, true))
                .expect("check in");
        }
        habit
    };
    let addr = spawn_app(&db_path).await;

    let response = get(
        addr,
        &format!(
            "/api/habits/{}/stats?from=2024-07-01&to=2024-07-05&as_of=2024-07-05",
            habit.id
        ),
    )
    .await;
    assert_eq!(response.status, 200);
    let body: serde_json::Value = serde_json::from_str(&response.body).expect("json body");
    assert_eq!(body["habit_id"], habit.id.to_string());
    assert_eq!(body["window"]["start"], "2024-07-01");
    assert_eq!(body["stats"]["current_streak"], 2);
    assert_eq!(body["stats"]["best_streak"], 2);
    assert_eq!(body["stats"]["completed_due_days"], 4);
    assert_eq!(body["stats"]["total_due_days"], 5);

    let trailing = get(
        addr,
        &format!("/api/habits/{}/stats?as_of=2024-07-05", habit.id),
    )
    .await;
    let body: serde_json::Value = serde_json::from_str(&trailing.body).expect("json body");
    assert_eq!(body["window"]["start"], "2024-06-08");
    assert_eq!(body["window"]["end"], "2024-07-05");

    let reversed = get(
        addr,
        &format!("/api/habits/{}/stats?from=2024-07-05&to=2024-07-01", habit.id),
    )
    .await;
    assert_eq!(reversed.status, 400);

    let missing = get(
        addr,
        "/api/habits/00000000-0000-4000-8000-000000000000/stats",
    )
    .await;
    assert_eq!(missing.status, 404);
    let error: serde_json::Value = serde_json::from_str(&missing.body).expect("json body");
    assert_eq!(error["error"]["status"], 404);
}
