//! Free windows in a working day, given everyone's sessions.
//!
//! Collects occupied sessions on the date as busy intervals, merges
//! overlapping or adjacent ones, then reports the gaps inside the window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{ConflictDuration, EngineConfig};
use crate::error::{EngineError, Result};
use crate::model::Student;
use crate::time::{effective_duration, effective_time, minutes_to_time, parse_time, time_to_minutes};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeWindow {
    pub start: String,
    pub end: String,
    pub duration_minutes: u32,
}

fn busy_intervals(students: &[Student], date: NaiveDate, config: &EngineConfig) -> Vec<(i32, i32)> {
    students
        .iter()
        .flat_map(|student| {
            student
                .sessions
                .iter()
                .filter(move |s| s.date == date && s.status.occupies_slot())
                .map(move |s| {
                    let start = time_to_minutes(effective_time(s, student, config));
                    let duration = match config.conflict_duration {
                        ConflictDuration::Fixed => config.default_duration_minutes,
                        ConflictDuration::PerSession => effective_duration(s, student, config),
                    };
                    (start, start + duration as i32)
                })
        })
        .collect()
}

/// Merge overlapping or adjacent intervals, clipped to the window.
fn merge_busy_periods(mut intervals: Vec<(i32, i32)>, window_start: i32, window_end: i32) -> Vec<(i32, i32)> {
    intervals.retain(|&(start, end)| start < window_end && end > window_start);
    for interval in &mut intervals {
        interval.0 = interval.0.max(window_start);
        interval.1 = interval.1.min(window_end);
    }
    intervals.sort_unstable();

    let mut merged: Vec<(i32, i32)> = Vec::new();
    for (start, end) in intervals {
        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }
    merged
}

/// Gaps between occupied sessions on `date` inside `[day_start, day_end)`.
///
/// # Errors
/// `EngineError::InvalidTime` if either bound is not `HH:MM` or the window
/// is empty.
pub fn free_windows(
    students: &[Student],
    date: NaiveDate,
    day_start: &str,
    day_end: &str,
    config: &EngineConfig,
) -> Result<Vec<FreeWindow>> {
    let window_start = parse_time(day_start)? as i32;
    let window_end = parse_time(day_end)? as i32;
    if window_start >= window_end {
        return Err(EngineError::InvalidTime(format!("{day_start}-{day_end}")));
    }

    let merged = merge_busy_periods(busy_intervals(students, date, config), window_start, window_end);

    let mut free = Vec::new();
    let mut cursor = window_start;
    for (busy_start, busy_end) in merged {
        if cursor < busy_start {
            free.push(window(cursor, busy_start));
        }
        cursor = cursor.max(busy_end);
    }
    if cursor < window_end {
        free.push(window(cursor, window_end));
    }
    Ok(free)
}

/// The first free window at least `min_minutes` long.
pub fn first_free_window(
    students: &[Student],
    date: NaiveDate,
    day_start: &str,
    day_end: &str,
    min_minutes: u32,
    config: &EngineConfig,
) -> Result<Option<FreeWindow>> {
    Ok(free_windows(students, date, day_start, day_end, config)?
        .into_iter()
        .find(|w| w.duration_minutes >= min_minutes))
}

fn window(start: i32, end: i32) -> FreeWindow {
    FreeWindow {
        start: minutes_to_time(start),
        end: minutes_to_time(end),
        duration_minutes: (end - start) as u32,
    }
}
