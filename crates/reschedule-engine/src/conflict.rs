//! Classify a proposed slot against every other session on the same day.
//!
//! Sessions are `[start, end)` minute intervals. Overlap is an error. A gap
//! of more than zero but less than `warning_gap_minutes` is a warning.
//! Back-to-back sessions (gap of exactly zero) are fine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{ConflictDuration, EngineConfig, SelfConflictPolicy};
use crate::model::{find_student, Session, Student};
use crate::time::{effective_duration, effective_time, time_to_minutes};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Warning,
    Error,
}

/// The session a candidate collides with or comes close to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictingSession {
    pub student_id: String,
    pub student_name: String,
    pub session_id: String,
    pub date: NaiveDate,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictInfo {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicting: Option<ConflictingSession>,
    /// Minutes between the two sessions, set for warnings only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap_minutes: Option<u32>,
}

impl ConflictInfo {
    pub fn none() -> Self {
        Self {
            severity: Severity::None,
            conflicting: None,
            gap_minutes: None,
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Classify moving `session_id` of `student_id` to `new_date` at `new_time`.
///
/// Scans every student's sessions on `new_date` in snapshot order, skipping
/// the candidate's own session and any cancelled or vacation session. The
/// first overlap found is final. Otherwise the closest near miss, if any, is
/// reported as a warning.
pub fn detect_conflict(
    students: &[Student],
    student_id: &str,
    session_id: &str,
    new_date: NaiveDate,
    new_time: &str,
    config: &EngineConfig,
) -> ConflictInfo {
    let new_start = time_to_minutes(new_time);
    let new_end = new_start + candidate_duration(students, student_id, session_id, config) as i32;

    let mut result = ConflictInfo::none();

    for other_student in students {
        if other_student.id == student_id && config.self_conflicts == SelfConflictPolicy::Ignore {
            continue;
        }
        for other in &other_student.sessions {
            let is_candidate = other_student.id == student_id && other.id == session_id;
            if other.date != new_date || is_candidate || !other.status.occupies_slot() {
                continue;
            }

            let other_time = effective_time(other, other_student, config);
            let other_start = time_to_minutes(other_time);
            let other_end = other_start + scan_duration(other, other_student, config) as i32;

            if overlaps(new_start, new_end, other_start, other_end) {
                return ConflictInfo {
                    severity: Severity::Error,
                    conflicting: Some(describe(other_student, other, other_time)),
                    gap_minutes: None,
                };
            }

            let gap = (new_start - other_end)
                .abs()
                .min((other_start - new_end).abs()) as u32;
            let closer = result.gap_minutes.is_none_or(|best| gap < best);
            if gap > 0 && gap < config.warning_gap_minutes && closer {
                result = ConflictInfo {
                    severity: Severity::Warning,
                    conflicting: Some(describe(other_student, other, other_time)),
                    gap_minutes: Some(gap),
                };
            }
        }
    }

    result
}

/// Two `[start, end)` intervals overlap: same start, either endpoint of the
/// new interval strictly inside the other, or the new one covering the other.
fn overlaps(new_start: i32, new_end: i32, other_start: i32, other_end: i32) -> bool {
    new_start == other_start
        || (new_start > other_start && new_start < other_end)
        || (new_end > other_start && new_end < other_end)
        || (new_start <= other_start && new_end >= other_end)
}

fn candidate_duration(
    students: &[Student],
    student_id: &str,
    session_id: &str,
    config: &EngineConfig,
) -> u32 {
    match config.conflict_duration {
        ConflictDuration::Fixed => config.default_duration_minutes,
        ConflictDuration::PerSession => find_student(students, student_id)
            .and_then(|st| st.session(session_id).map(|s| effective_duration(s, st, config)))
            .unwrap_or(config.default_duration_minutes),
    }
}

fn scan_duration(session: &Session, student: &Student, config: &EngineConfig) -> u32 {
    match config.conflict_duration {
        ConflictDuration::Fixed => config.default_duration_minutes,
        ConflictDuration::PerSession => effective_duration(session, student, config),
    }
}

fn describe(student: &Student, session: &Session, time: &str) -> ConflictingSession {
    ConflictingSession {
        student_id: student.id.clone(),
        student_name: student.name.clone(),
        session_id: session.id.clone(),
        date: session.date,
        time: time.to_string(),
    }
}
