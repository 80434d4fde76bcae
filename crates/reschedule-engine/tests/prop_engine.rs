//! Property-based tests for the rescheduling pipeline using proptest.
//!
//! These check invariants that hold for any roster and rule, not just the
//! scenarios in `engine_tests.rs`.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use proptest::prelude::*;
use reschedule_engine::compute::reschedule;
use reschedule_engine::time::{minutes_to_time, time_to_minutes};
use reschedule_engine::{
    Direction, EngineError, ModificationRule, Period, RescheduleEngine, Session, SessionStatus,
    Student,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_time() -> impl Strategy<Value = String> {
    (0u32..24, 0u32..60).prop_map(|(h, m)| format!("{:02}:{:02}", h, m))
}

fn arb_weekday() -> impl Strategy<Value = Weekday> {
    prop_oneof![
        Just(Weekday::Mon),
        Just(Weekday::Tue),
        Just(Weekday::Wed),
        Just(Weekday::Thu),
        Just(Weekday::Fri),
        Just(Weekday::Sat),
        Just(Weekday::Sun),
    ]
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Later), Just(Direction::Earlier)]
}

/// A date in March 2024.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1u32..=31).prop_map(|d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap())
}

fn arb_status() -> impl Strategy<Value = SessionStatus> {
    prop_oneof![
        6 => Just(SessionStatus::Scheduled),
        1 => Just(SessionStatus::Completed),
        1 => Just(SessionStatus::Cancelled),
        1 => Just(SessionStatus::Vacation),
    ]
}

fn arb_session() -> impl Strategy<Value = (NaiveDate, Option<String>, SessionStatus)> {
    (arb_date(), proptest::option::of(arb_time()), arb_status())
}

/// Up to four students with up to eight sessions each, ids unique per roster.
fn arb_roster() -> impl Strategy<Value = Vec<Student>> {
    proptest::collection::vec(proptest::collection::vec(arb_session(), 0..8), 1..4).prop_map(
        |students| {
            students
                .into_iter()
                .enumerate()
                .map(|(i, sessions)| {
                    let mut st = Student::new(format!("s{i}"), format!("Student {i}"));
                    st.sessions = sessions
                        .into_iter()
                        .enumerate()
                        .map(|(j, (date, time, status))| Session {
                            id: format!("s{i}-{j}"),
                            date,
                            time,
                            status,
                            duration_minutes: None,
                        })
                        .collect();
                    st
                })
                .collect()
        },
    )
}

fn arb_rule() -> impl Strategy<Value = ModificationRule> {
    prop_oneof![
        (arb_direction(), 0u32..6, 0u32..60)
            .prop_filter("non-zero", |(_, h, m)| h + m > 0)
            .prop_map(|(d, h, m)| ModificationRule::offset(d, h, m)),
        arb_time().prop_map(ModificationRule::specific),
        (arb_weekday(), arb_time(), arb_weekday(), arb_time())
            .prop_filter("different days", |(a, _, b, _)| a != b)
            .prop_map(|(a, at, b, bt)| ModificationRule::day_change(a, at, b, bt)),
    ]
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

fn march() -> Vec<Period> {
    vec![Period::month_of(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())]
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn minutes_round_trip(minutes in 0i32..1440) {
        prop_assert_eq!(time_to_minutes(&minutes_to_time(minutes)), minutes);
    }

    #[test]
    fn wraparound_stays_in_day(minutes in -100_000i32..100_000) {
        let t = time_to_minutes(&minutes_to_time(minutes));
        prop_assert!((0..1440).contains(&t));
        prop_assert_eq!(t, minutes.rem_euclid(1440));
    }

    #[test]
    fn offset_there_and_back_restores_time(
        time in arb_time(),
        dir in arb_direction(),
        hours in 0u32..30,
        minutes in 0u32..60,
    ) {
        let d = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let forward = ModificationRule::offset(dir, hours, minutes);
        let back = ModificationRule::offset(dir.reversed(), hours, minutes);
        let (d1, t1) = reschedule(d, &time, &forward);
        let (d2, t2) = reschedule(d1, &t1, &back);
        prop_assert_eq!(d2, d);
        prop_assert_eq!(t2, time);
    }

    #[test]
    fn day_change_lands_on_target_strictly_later(
        date in arb_date(),
        to in arb_weekday(),
        to_time in arb_time(),
    ) {
        let from = date.weekday();
        let rule = ModificationRule::day_change(from, "16:00", to, to_time.clone());
        if from == to {
            prop_assert!(matches!(rule.validate(), Err(EngineError::SameWeekday(_))));
        } else {
            prop_assert!(rule.validate().is_ok());
            let (new_date, new_time) = reschedule(date, "16:00", &rule);
            prop_assert_eq!(new_date.weekday(), to);
            prop_assert!(new_date > date);
            prop_assert!(new_date - date < Duration::days(7));
            prop_assert_eq!(new_time, to_time);
        }
    }

    #[test]
    fn preview_is_deterministic_and_complete(roster in arb_roster(), rule in arb_rule()) {
        let engine = RescheduleEngine::default();
        let first = engine.preview(&roster, "s0", &march(), &rule).unwrap();
        let second = engine.preview(&roster, "s0", &march(), &rule).unwrap();
        prop_assert_eq!(&first, &second);

        let eligible = reschedule_engine::select_sessions(&roster[0], &march(), &rule, engine.config());
        prop_assert_eq!(first.len(), eligible.len());

        // Buckets keep the selector's date order.
        for bucket in [&first.safe, &first.warnings, &first.conflicts] {
            for pair in bucket.windows(2) {
                prop_assert!(pair[0].change.original_date <= pair[1].change.original_date);
            }
        }
    }

    #[test]
    fn only_scheduled_sessions_become_candidates(roster in arb_roster(), rule in arb_rule()) {
        let engine = RescheduleEngine::default();
        let result = engine.preview(&roster, "s0", &march(), &rule).unwrap();
        for c in result.safe.iter().chain(&result.warnings).chain(&result.conflicts) {
            let session = roster[0].session(&c.change.session_id).unwrap();
            prop_assert_eq!(session.status, SessionStatus::Scheduled);
        }
    }
}
