use chrono::{Duration, NaiveDate};
use streakly_core::db::open_db_in_memory;
use streakly_core::{
    compute_stats, CheckIn, CheckInRepository, CheckInWrite, HabitDraft, HabitRepository,
    Schedule, SqliteCheckInRepository, SqliteHabitRepository, StatsWindow, WeekdaySet,
};
use uuid::Uuid;

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn done(date: NaiveDate) -> CheckIn {
    CheckIn {
        habit_id: Uuid::nil(),
        date,
        completed: true,
        note: None,
        created_at: 0,
        updated_at: 0,
    }
}

#[test]
fn exercise_on_weekdays_breaks_on_missed_friday() {
    // Week of 2024-06-10 (Monday) .. 2024-06-14 (Friday).
    let monday = ymd(2024, 6, 10);
    let thursday = ymd(2024, 6, 13);
    let friday = ymd(2024, 6, 14);

    let conn = open_db_in_memory().unwrap();
    let habits = SqliteHabitRepository::try_new(&conn).unwrap();
    let check_ins = SqliteCheckInRepository::try_new(&conn).unwrap();
    let exercise = habits
        .create_habit(&HabitDraft::new("Exercise", Schedule::Weekdays))
        .unwrap();
    for offset in 0..4 {
        check_ins
            .upsert_check_in(&CheckInWrite::new(
                exercise.id,
                monday + Duration::days(offset),
                true,
            ))
            .unwrap();
    }
    let history = check_ins.list_check_ins(exercise.id).unwrap();
    let window = StatsWindow::new(monday, friday);

    let as_of_friday = compute_stats(&exercise.schedule, &history, friday, window);
    assert_eq!(as_of_friday.current_streak, 0);
    assert_eq!(as_of_friday.best_streak, 4);
    assert_eq!(as_of_friday.completed_due_days, 4);
    assert_eq!(as_of_friday.total_due_days, 5);
    assert!((as_of_friday.success_rate - 0.8).abs() < f64::EPSILON);

    let as_of_thursday = compute_stats(&exercise.schedule, &history, thursday, window);
    assert_eq!(as_of_thursday.current_streak, 4);
    assert_eq!(as_of_thursday.total_due_days, 4);
    assert!((as_of_thursday.success_rate - 1.0).abs() < f64::EPSILON);
}

#[test]
fn read_daily_for_ten_days_then_gap() {
    let start = ymd(2024, 1, 1);
    let history = (0..10)
        .map(|offset| done(start + Duration::days(offset)))
        .collect::<Vec<_>>();
    let as_of = start + Duration::days(14);

    let stats = compute_stats(
        &Schedule::Daily,
        &history,
        as_of,
        StatsWindow::trailing(as_of, 28),
    );
    assert_eq!(stats.best_streak, 10);
    assert_eq!(stats.current_streak, 0);
}

#[test]
fn success_rate_is_zero_when_window_has_no_due_days() {
    // 2024-06-15 and 2024-06-16 are a weekend.
    let stats = compute_stats(
        &Schedule::Weekdays,
        &[done(ymd(2024, 6, 14))],
        ymd(2024, 6, 16),
        StatsWindow::new(ymd(2024, 6, 15), ymd(2024, 6, 16)),
    );
    assert_eq!(stats.total_due_days, 0);
    assert_eq!(stats.success_rate, 0.0);
}

#[test]
fn future_due_days_are_excluded_from_all_counts() {
    let as_of = ymd(2024, 3, 10);
    let history = [
        done(ymd(2024, 3, 9)),
        done(ymd(2024, 3, 10)),
        done(ymd(2024, 3, 11)),
        done(ymd(2024, 3, 12)),
    ];

    let stats = compute_stats(
        &Schedule::Daily,
        &history,
        as_of,
        StatsWindow::new(ymd(2024, 3, 9), ymd(2024, 3, 20)),
    );
    assert_eq!(stats.total_due_days, 2);
    assert_eq!(stats.completed_due_days, 2);
    assert_eq!(stats.current_streak, 2);
    assert_eq!(stats.best_streak, 2);
}

#[test]
fn success_rate_stays_within_unit_interval() {
    let schedule = Schedule::CustomDays(WeekdaySet::from_day_numbers([0, 2, 4]).unwrap());
    let start = ymd(2024, 2, 1);
    let history = (0..40)
        .filter(|offset| offset % 3 != 0)
        .map(|offset| done(start + Duration::days(offset)))
        .collect::<Vec<_>>();

    for days in [0, 1, 7, 28, 90] {
        let as_of = start + Duration::days(35);
        let stats = compute_stats(&schedule, &history, as_of, StatsWindow::trailing(as_of, days));
        assert!((0.0..=1.0).contains(&stats.success_rate), "days={days}");
        assert!(stats.completed_due_days <= stats.total_due_days);
    }
}

#[test]
fn current_streak_resets_at_first_incomplete_due_day() {
    let history = [
        done(ymd(2024, 8, 1)),
        done(ymd(2024, 8, 2)),
        CheckIn {
            completed: false,
            ..done(ymd(2024, 8, 3))
        },
        done(ymd(2024, 8, 4)),
        done(ymd(2024, 8, 5)),
    ];
    let as_of = ymd(2024, 8, 5);
    let stats = compute_stats(
        &Schedule::Daily,
        &history,
        as_of,
        StatsWindow::trailing(as_of, 7),
    );
    assert_eq!(stats.current_streak, 2);
    assert_eq!(stats.best_streak, 2);
}
