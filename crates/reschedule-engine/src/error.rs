//! Error types for reschedule-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Day change must move to a different weekday (both are {0})")]
    SameWeekday(chrono::Weekday),

    #[error("Offset must be non-zero")]
    ZeroOffset,

    #[error("Offset of {hours}h{minutes:02}m is too large")]
    OffsetTooLarge { hours: u32, minutes: u32 },

    #[error("No periods selected")]
    NoPeriods,

    #[error("Invalid period: start {start} is after end {end}")]
    InvertedPeriod {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Period {start}..={end} is already selected")]
    DuplicatePeriod {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Invalid time '{0}': expected HH:MM")]
    InvalidTime(String),

    #[error("Unknown student: {0}")]
    UnknownStudent(String),

    #[error("Unknown session {session_id} for student {student_id}")]
    UnknownSession {
        student_id: String,
        session_id: String,
    },

    #[error("Session {0} is not scheduled")]
    NotScheduled(String),

    #[error("Invalid RRULE: {0}")]
    InvalidRule(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Mutation failed for session {session_id}: {message}")]
    Mutation { session_id: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl EngineError {
    /// True for errors raised before any computation because the user's
    /// selection or rule is unusable.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            EngineError::SameWeekday(_)
                | EngineError::ZeroOffset
                | EngineError::OffsetTooLarge { .. }
                | EngineError::NoPeriods
                | EngineError::InvertedPeriod { .. }
                | EngineError::DuplicatePeriod { .. }
                | EngineError::InvalidTime(_)
                | EngineError::UnknownStudent(_)
                | EngineError::NotScheduled(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
