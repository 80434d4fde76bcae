//! Tests for period construction and date membership.

use chrono::NaiveDate;
use reschedule_engine::{is_in_any_period, EngineError, Period, PeriodKind, PeriodSelection};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn week_runs_monday_to_sunday() {
    // 2024-03-07 is a Thursday
    let week = Period::week_of(date(2024, 3, 7));
    assert_eq!(week.start, date(2024, 3, 4));
    assert_eq!(week.end, date(2024, 3, 10));
    assert_eq!(week.kind, PeriodKind::Week);
    assert_eq!(week.label, "Week of 2024-03-04");
}

#[test]
fn month_covers_whole_month() {
    let feb = Period::month_of(date(2024, 2, 14));
    assert_eq!(feb.start, date(2024, 2, 1));
    assert_eq!(feb.end, date(2024, 2, 29), "2024 is a leap year");

    let dec = Period::month_of(date(2023, 12, 31));
    assert_eq!(dec.start, date(2023, 12, 1));
    assert_eq!(dec.end, date(2023, 12, 31));
    assert_eq!(dec.label, "Month 2023-12");
}

#[test]
fn custom_rejects_inverted_range() {
    let err = Period::custom(date(2024, 3, 10), date(2024, 3, 1)).unwrap_err();
    assert!(matches!(err, EngineError::InvertedPeriod { .. }));
    assert!(err.is_configuration());
}

#[test]
fn membership_is_inclusive() {
    let p = Period::custom(date(2024, 3, 1), date(2024, 3, 10)).unwrap();
    assert!(p.contains(date(2024, 3, 1)));
    assert!(p.contains(date(2024, 3, 10)));
    assert!(!p.contains(date(2024, 2, 29)));
    assert!(!p.contains(date(2024, 3, 11)));
}

#[test]
fn first_matching_label_wins() {
    let periods = vec![
        Period::week_of(date(2024, 3, 4)),
        Period::month_of(date(2024, 3, 4)),
    ];

    let hit = is_in_any_period(&periods, date(2024, 3, 5));
    assert!(hit.in_period);
    assert_eq!(hit.matched_label, Some("Week of 2024-03-04"));

    let hit = is_in_any_period(&periods, date(2024, 3, 20));
    assert_eq!(hit.matched_label, Some("Month 2024-03"));

    let miss = is_in_any_period(&periods, date(2024, 4, 1));
    assert!(!miss.in_period);
    assert_eq!(miss.matched_label, None);
}

#[test]
fn resolver_tolerates_duplicates() {
    let week = Period::week_of(date(2024, 3, 4));
    let periods = vec![week.clone(), week];
    assert!(is_in_any_period(&periods, date(2024, 3, 6)).in_period);
}

#[test]
fn empty_period_list_matches_nothing() {
    assert!(!is_in_any_period(&[], date(2024, 3, 6)).in_period);
}

#[test]
fn selection_rejects_duplicate_range() {
    let mut selection = PeriodSelection::new();
    selection.add(Period::week_of(date(2024, 3, 4))).unwrap();

    // A custom period with the same range is still a duplicate.
    let same = Period::custom(date(2024, 3, 4), date(2024, 3, 10)).unwrap();
    let err = selection.add(same).unwrap_err();
    assert!(matches!(err, EngineError::DuplicatePeriod { .. }));

    // Overlapping but distinct is fine.
    selection.add(Period::month_of(date(2024, 3, 4))).unwrap();
    assert_eq!(selection.periods().len(), 2);
}

#[test]
fn selection_remove_by_range() {
    let mut selection =
        PeriodSelection::from_periods([Period::week_of(date(2024, 3, 4))]).unwrap();
    assert!(!selection.remove(date(2024, 3, 4), date(2024, 3, 9)));
    assert!(selection.remove(date(2024, 3, 4), date(2024, 3, 10)));
    assert!(selection.is_empty());
}
