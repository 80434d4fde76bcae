//! Tests for session selection and new-slot computation.

use chrono::{Datelike, NaiveDate, Weekday};
use reschedule_engine::compute::{next_weekday_after, reschedule};
use reschedule_engine::{
    compute_candidates, select_sessions, Direction, EngineConfig, ModificationRule, Period,
    Session, SessionStatus, Student,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn march() -> Vec<Period> {
    vec![Period::month_of(date(2024, 3, 1))]
}

/// Student with weekly Monday 16:00 sessions through March 2024, plus a
/// Wednesday session, listed out of date order.
fn weekly_student() -> Student {
    let mut s = Student::new("x", "Xavier");
    s.sessions = vec![
        Session::scheduled("m3", date(2024, 3, 18), Some("16:00")),
        Session::scheduled("m1", date(2024, 3, 4), Some("16:00")),
        Session::scheduled("w1", date(2024, 3, 6), Some("16:00")),
        Session::scheduled("m2", date(2024, 3, 11), Some("16:20")),
        Session::scheduled("m4", date(2024, 3, 25), Some("17:00")),
        Session::scheduled("feb", date(2024, 2, 26), Some("16:00")),
    ];
    s
}

fn ids(sessions: &[&Session]) -> Vec<String> {
    sessions.iter().map(|s| s.id.clone()).collect()
}

#[test]
fn offset_selects_every_scheduled_session_in_range_by_date() {
    let student = weekly_student();
    let rule = ModificationRule::offset(Direction::Later, 1, 0);

    let selected = select_sessions(&student, &march(), &rule, &EngineConfig::default());

    assert_eq!(ids(&selected), vec!["m1", "w1", "m2", "m3", "m4"]);
}

#[test]
fn non_scheduled_sessions_never_selected() {
    let mut student = weekly_student();
    student.sessions[1].status = SessionStatus::Completed;
    student.sessions[2].status = SessionStatus::Cancelled;
    student.sessions[3].status = SessionStatus::Vacation;
    let rule = ModificationRule::specific("15:00");

    let selected = select_sessions(&student, &march(), &rule, &EngineConfig::default());

    assert_eq!(ids(&selected), vec!["m3", "m4"]);
}

#[test]
fn overlapping_periods_select_each_session_once() {
    let student = weekly_student();
    let periods = vec![
        Period::week_of(date(2024, 3, 4)),
        Period::month_of(date(2024, 3, 4)),
        Period::custom(date(2024, 3, 1), date(2024, 3, 12)).unwrap(),
    ];
    let rule = ModificationRule::specific("15:00");

    let selected = select_sessions(&student, &periods, &rule, &EngineConfig::default());

    assert_eq!(selected.len(), 5);
}

#[test]
fn day_change_matches_weekday_and_time_tolerance() {
    let student = weekly_student();
    let rule = ModificationRule::day_change(Weekday::Mon, "16:00", Weekday::Fri, "13:00");

    let selected = select_sessions(&student, &march(), &rule, &EngineConfig::default());

    // m2 drifted 20 minutes and still matches; m4 is an hour off; w1 is a Wednesday.
    assert_eq!(ids(&selected), vec!["m1", "m2", "m3"]);
}

#[test]
fn day_change_tolerance_boundary_is_inclusive() {
    let mut student = Student::new("x", "X");
    student.sessions = vec![
        Session::scheduled("a", date(2024, 3, 4), Some("16:30")),
        Session::scheduled("b", date(2024, 3, 11), Some("16:31")),
        Session::scheduled("c", date(2024, 3, 18), Some("15:30")),
    ];
    let rule = ModificationRule::day_change(Weekday::Mon, "16:00", Weekday::Tue, "16:00");

    let selected = select_sessions(&student, &march(), &rule, &EngineConfig::default());

    assert_eq!(ids(&selected), vec!["a", "c"]);
}

#[test]
fn day_change_uses_student_default_time() {
    let mut student = Student::new("x", "X");
    student.default_session_time = Some("10:00".to_string());
    student
        .sessions
        .push(Session::scheduled("a", date(2024, 3, 4), None));

    let at_ten = ModificationRule::day_change(Weekday::Mon, "10:00", Weekday::Tue, "10:00");
    let at_four = ModificationRule::day_change(Weekday::Mon, "16:00", Weekday::Tue, "10:00");
    let config = EngineConfig::default();

    assert_eq!(select_sessions(&student, &march(), &at_ten, &config).len(), 1);
    assert!(select_sessions(&student, &march(), &at_four, &config).is_empty());
}

#[test]
fn offset_keeps_date_and_wraps_time() {
    let d = date(2024, 3, 4);
    let later = ModificationRule::offset(Direction::Later, 0, 30);
    let earlier = ModificationRule::offset(Direction::Earlier, 0, 30);

    assert_eq!(reschedule(d, "23:45", &later), (d, "00:15".to_string()));
    assert_eq!(reschedule(d, "00:10", &earlier), (d, "23:40".to_string()));
}

#[test]
fn offset_of_many_days_reduces_to_time_of_day() {
    let d = date(2024, 3, 4);
    let huge_later = ModificationRule::Offset {
        direction: Direction::Later,
        minutes: u32::MAX - 10,
    };
    let past_i32 = ModificationRule::Offset {
        direction: Direction::Later,
        minutes: 2_147_483_000,
    };
    let huge_earlier = ModificationRule::Offset {
        direction: Direction::Earlier,
        minutes: u32::MAX,
    };

    // u32::MAX - 10 is 245 minutes past a whole number of days.
    assert_eq!(reschedule(d, "23:59", &huge_later), (d, "04:04".to_string()));
    assert_eq!(reschedule(d, "23:59", &past_i32), (d, "15:19".to_string()));
    assert_eq!(reschedule(d, "10:00", &huge_earlier), (d, "05:45".to_string()));
}

#[test]
fn specific_sets_time_only() {
    let d = date(2024, 3, 4);
    assert_eq!(
        reschedule(d, "16:00", &ModificationRule::specific("09:30")),
        (d, "09:30".to_string())
    );
}

#[test]
fn day_change_moves_to_following_weekday() {
    let monday = date(2024, 3, 4);
    let rule = ModificationRule::day_change(Weekday::Mon, "16:00", Weekday::Fri, "13:00");

    assert_eq!(reschedule(monday, "16:00", &rule), (date(2024, 3, 8), "13:00".to_string()));
}

#[test]
fn day_change_to_earlier_weekday_goes_to_next_week() {
    let friday = date(2024, 3, 8);
    let rule = ModificationRule::day_change(Weekday::Fri, "16:00", Weekday::Mon, "16:00");

    let (new_date, _) = reschedule(friday, "16:00", &rule);
    assert_eq!(new_date, date(2024, 3, 11));
}

#[test]
fn next_weekday_is_strictly_after() {
    let monday = date(2024, 3, 4);
    assert_eq!(next_weekday_after(monday, Weekday::Mon), date(2024, 3, 11));
    assert_eq!(next_weekday_after(monday, Weekday::Tue), date(2024, 3, 5));
    assert_eq!(next_weekday_after(monday, Weekday::Sun), date(2024, 3, 10));
    // Crosses a month boundary.
    assert_eq!(next_weekday_after(date(2024, 3, 29), Weekday::Mon), date(2024, 4, 1));
    assert_eq!(next_weekday_after(date(2024, 3, 29), Weekday::Mon).weekday(), Weekday::Mon);
}

#[test]
fn candidates_record_effective_original_time() {
    let mut student = Student::new("x", "Xavier");
    student.default_session_time = Some("15:00".to_string());
    student.sessions = vec![
        Session::scheduled("a", date(2024, 3, 4), None),
        Session::scheduled("b", date(2024, 3, 5), Some("10:00")),
    ];
    let rule = ModificationRule::offset(Direction::Earlier, 1, 15);
    let config = EngineConfig::default();
    let selected = select_sessions(&student, &march(), &rule, &config);

    let candidates = compute_candidates(&student, &selected, &rule, &config);

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].original_time, "15:00");
    assert_eq!(candidates[0].new_time, "13:45");
    assert_eq!(candidates[1].original_time, "10:00");
    assert_eq!(candidates[1].new_time, "08:45");
    assert_eq!(candidates[1].student_name, "Xavier");
    assert!(!candidates[0].moves_date());
}
