//! `HH:MM` time-of-day arithmetic on minute offsets.
//!
//! Times are minutes since midnight. Arithmetic that crosses midnight wraps
//! into `[0, 1439]` in both directions.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::model::{Session, Student};

pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Minutes since midnight of the default session time (16:00).
pub const DEFAULT_TIME_MINUTES: i32 = 16 * 60;

/// Convert `HH:MM` to minutes since midnight.
///
/// An empty string yields [`DEFAULT_TIME_MINUTES`]. Input comes from the
/// roster, so anything that does not parse as a number counts as zero.
pub fn time_to_minutes(time: &str) -> i32 {
    let time = time.trim();
    if time.is_empty() {
        return DEFAULT_TIME_MINUTES;
    }
    let mut parts = time.splitn(2, ':');
    let hours: i32 = parts.next().and_then(|h| h.trim().parse().ok()).unwrap_or(0);
    let minutes: i32 = parts.next().and_then(|m| m.trim().parse().ok()).unwrap_or(0);
    hours.saturating_mul(60).saturating_add(minutes)
}

/// Format minutes as `HH:MM`, wrapping the input modulo one day first.
///
/// ```
/// use reschedule_engine::time::{minutes_to_time, time_to_minutes};
///
/// assert_eq!(minutes_to_time(time_to_minutes("23:45") + 30), "00:15");
/// assert_eq!(minutes_to_time(time_to_minutes("00:10") - 30), "23:40");
/// ```
pub fn minutes_to_time(minutes: i32) -> String {
    let normalized = minutes.rem_euclid(MINUTES_PER_DAY);
    format!("{:02}:{:02}", normalized / 60, normalized % 60)
}

/// Strictly validate an `HH:MM` string, returning minutes since midnight.
pub fn parse_time(time: &str) -> Result<u32> {
    let invalid = || EngineError::InvalidTime(time.to_string());
    let (h, m) = time.split_once(':').ok_or_else(invalid)?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return Err(invalid());
    }
    let hours: u32 = h.parse().map_err(|_| invalid())?;
    let minutes: u32 = m.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

/// Resolve the time a session actually takes place at: its own time, then
/// the student's default, then the configured default.
pub fn effective_time<'a>(
    session: &'a Session,
    student: &'a Student,
    config: &'a EngineConfig,
) -> &'a str {
    session
        .time
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| {
            student
                .default_session_time
                .as_deref()
                .filter(|t| !t.trim().is_empty())
        })
        .unwrap_or(config.default_session_time.as_str())
}

/// Resolve a session's length with the same three-level fallback.
pub fn effective_duration(session: &Session, student: &Student, config: &EngineConfig) -> u32 {
    session
        .duration_minutes
        .or(student.default_duration_minutes)
        .unwrap_or(config.default_duration_minutes)
}
