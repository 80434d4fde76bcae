//! Pick the sessions of one student that a bulk edit applies to.

use chrono::Datelike;

use crate::config::EngineConfig;
use crate::model::{Session, Student};
use crate::period::{is_in_any_period, Period};
use crate::rule::ModificationRule;
use crate::time::{effective_time, time_to_minutes};

/// Sessions of `student` eligible for `rule` within `periods`, ordered by date.
///
/// Only scheduled sessions qualify. A day-change rule further requires the
/// session to fall on the source weekday with an effective time within
/// `day_change_tolerance_minutes` of the source time. Ties on date keep the
/// student's own ordering.
pub fn select_sessions<'a>(
    student: &'a Student,
    periods: &[Period],
    rule: &ModificationRule,
    config: &EngineConfig,
) -> Vec<&'a Session> {
    let mut selected: Vec<&Session> = student
        .sessions
        .iter()
        .filter(|s| s.is_scheduled())
        .filter(|s| is_in_any_period(periods, s.date).in_period)
        .filter(|s| matches_source_slot(s, student, rule, config))
        .collect();

    selected.sort_by_key(|s| s.date);
    selected
}

fn matches_source_slot(
    session: &Session,
    student: &Student,
    rule: &ModificationRule,
    config: &EngineConfig,
) -> bool {
    match rule {
        ModificationRule::DayChange {
            from_weekday,
            from_time,
            ..
        } => {
            if session.date.weekday() != *from_weekday {
                return false;
            }
            let actual = time_to_minutes(effective_time(session, student, config));
            let wanted = time_to_minutes(from_time);
            (actual - wanted).abs() <= config.day_change_tolerance_minutes as i32
        }
        ModificationRule::Offset { .. } | ModificationRule::Specific { .. } => true,
    }
}
