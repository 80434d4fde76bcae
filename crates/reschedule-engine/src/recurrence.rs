//! Expand a student's recurring slot into concrete sessions.
//!
//! Wraps the `rrule` crate (v0.13) and validates the timezone through
//! `chrono-tz`. Each instance becomes a scheduled [`Session`] on its local
//! date, with a deterministic id so re-expanding the same rule yields the same
//! sessions.

use chrono::NaiveDate;
use rrule::RRuleSet;
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::model::Session;
use crate::time::parse_time;

/// Upper bound on instances for rules without COUNT.
pub const MAX_INSTANCES: u16 = 500;

/// Expand `rrule` starting on `first_date` at `time` into sessions.
///
/// # Arguments
/// - `student_id` -- Prefix of each generated session id
/// - `rrule` -- RFC 5545 RRULE string (e.g., "FREQ=WEEKLY;BYDAY=MO")
/// - `first_date` -- Date of the first occurrence (DTSTART)
/// - `time` -- `HH:MM` local time of every occurrence
/// - `timezone` -- IANA timezone (e.g., "Europe/Berlin")
/// - `until` -- Optional last date (inclusive)
/// - `count` -- Optional maximum number of sessions
///
/// # Errors
/// `EngineError::InvalidRule` for an empty or unparseable RRULE,
/// `EngineError::InvalidTimezone` for an unknown timezone and
/// `EngineError::InvalidTime` for a malformed `time`.
pub fn expand_sessions(
    student_id: &str,
    rrule: &str,
    first_date: NaiveDate,
    time: &str,
    timezone: &str,
    until: Option<NaiveDate>,
    count: Option<u32>,
) -> Result<Vec<Session>> {
    if rrule.trim().is_empty() {
        return Err(EngineError::InvalidRule("empty RRULE string".to_string()));
    }
    let minutes = parse_time(time)?;
    if count == Some(0) {
        return Ok(Vec::new());
    }

    let _tz: chrono_tz::Tz = timezone
        .parse()
        .map_err(|_| EngineError::InvalidTimezone(timezone.to_string()))?;

    let dtstart = format!(
        "{}T{:02}{:02}00",
        first_date.format("%Y%m%d"),
        minutes / 60,
        minutes % 60
    );

    let mut rule = rrule.trim().to_string();
    if let Some(c) = count {
        if !rule.to_uppercase().contains("COUNT=") {
            rule = format!("{};COUNT={}", rule, c);
        }
    }
    // UNTIL must be in DTSTART's timezone; UTC needs the trailing "Z".
    if let Some(last) = until {
        if !rule.to_uppercase().contains("UNTIL=") {
            let mut until_ical = format!("{}T235959", last.format("%Y%m%d"));
            if timezone == "UTC" {
                until_ical.push('Z');
            }
            rule = format!("{};UNTIL={}", rule, until_ical);
        }
    }

    let text = format!("DTSTART;TZID={}:{}\nRRULE:{}", timezone, dtstart, rule);
    let set: RRuleSet = text
        .parse()
        .map_err(|e| EngineError::InvalidRule(format!("{}", e)))?;

    let limit = count
        .map(|c| c.min(MAX_INSTANCES as u32) as u16)
        .unwrap_or(MAX_INSTANCES);
    let mut sessions: Vec<Session> = set
        .all(limit)
        .dates
        .into_iter()
        .map(|dt| {
            let date = dt.date_naive();
            Session::scheduled(format!("{}-{}", student_id, date.format("%Y-%m-%d")), date, Some(time))
        })
        .collect();

    if let Some(c) = count {
        sessions.truncate(c as usize);
    }
    debug!(student_id, instances = sessions.len(), "recurrence expanded");
    Ok(sessions)
}
