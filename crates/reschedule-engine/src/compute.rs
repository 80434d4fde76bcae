//! Compute the new slot for each selected session.
//!
//! The result depends only on the original date, the effective time and the
//! rule, so recomputing with the same inputs always yields the same
//! candidates.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::model::{Session, Student};
use crate::rule::ModificationRule;
use crate::time::{effective_time, minutes_to_time, time_to_minutes, MINUTES_PER_DAY};

/// A proposed, not yet applied, change to one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateChange {
    pub student_id: String,
    pub student_name: String,
    pub session_id: String,
    pub original_date: NaiveDate,
    /// The effective time before the change.
    pub original_time: String,
    /// The session's own stored time, `None` when it follows a default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_time: Option<String>,
    pub new_date: NaiveDate,
    pub new_time: String,
}

impl CandidateChange {
    pub fn moves_date(&self) -> bool {
        self.original_date != self.new_date
    }
}

/// New `(date, time)` for a session at `date`/`time` under `rule`.
pub fn reschedule(date: NaiveDate, time: &str, rule: &ModificationRule) -> (NaiveDate, String) {
    match rule {
        ModificationRule::Offset { direction, minutes } => {
            // Whole days never move the time of day, so reduce before signing.
            let delta = (*minutes % MINUTES_PER_DAY as u32) as i32;
            let start = time_to_minutes(time).rem_euclid(MINUTES_PER_DAY);
            (date, minutes_to_time(start + direction.sign() * delta))
        }
        ModificationRule::Specific { time: new_time } => (date, new_time.clone()),
        ModificationRule::DayChange {
            to_weekday,
            to_time,
            ..
        } => (next_weekday_after(date, *to_weekday), to_time.clone()),
    }
}

/// The first `target` weekday strictly after `date`.
pub fn next_weekday_after(date: NaiveDate, target: Weekday) -> NaiveDate {
    let current = date.weekday().num_days_from_monday() as i64;
    let wanted = target.num_days_from_monday() as i64;
    let mut day_diff = wanted - current;
    if day_diff <= 0 {
        day_diff += 7;
    }
    date + Duration::days(day_diff)
}

/// Build candidates for the already-selected sessions of one student,
/// preserving their order.
pub fn compute_candidates(
    student: &Student,
    sessions: &[&Session],
    rule: &ModificationRule,
    config: &EngineConfig,
) -> Vec<CandidateChange> {
    sessions
        .iter()
        .map(|session| {
            let original_time = effective_time(session, student, config).to_string();
            let (new_date, new_time) = reschedule(session.date, &original_time, rule);
            CandidateChange {
                student_id: student.id.clone(),
                student_name: student.name.clone(),
                session_id: session.id.clone(),
                original_date: session.date,
                original_time,
                recorded_time: session.time.clone(),
                new_date,
                new_time,
            }
        })
        .collect()
}
