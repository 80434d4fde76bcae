//! Pick the sessions a vacation covers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::model::Student;
use crate::period::{is_in_any_period, Period};
use crate::time::effective_time;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationCandidate {
    pub session_id: String,
    pub date: NaiveDate,
    pub time: String,
    /// Label of the first selected period containing the session.
    pub period_label: String,
}

/// Scheduled sessions of `student` inside any of `periods`, by date.
pub fn plan_vacation(
    student: &Student,
    periods: &[Period],
    config: &EngineConfig,
) -> Vec<VacationCandidate> {
    let mut out: Vec<VacationCandidate> = student
        .sessions
        .iter()
        .filter(|s| s.is_scheduled())
        .filter_map(|s| {
            let hit = is_in_any_period(periods, s.date);
            hit.matched_label.map(|label| VacationCandidate {
                session_id: s.id.clone(),
                date: s.date,
                time: effective_time(s, student, config).to_string(),
                period_label: label.to_string(),
            })
        })
        .collect();
    out.sort_by_key(|c| c.date);
    out
}
