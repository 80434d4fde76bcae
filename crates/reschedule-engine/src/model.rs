//! Roster snapshot types: students and their sessions.
//!
//! Field names follow the host's camelCase JSON so a snapshot exported by the
//! app deserializes without a mapping layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    Vacation,
}

impl SessionStatus {
    /// Cancelled and vacation sessions do not occupy their slot.
    pub fn occupies_slot(self) -> bool {
        !matches!(self, SessionStatus::Cancelled | SessionStatus::Vacation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub date: NaiveDate,
    /// `HH:MM`; `None` means the student's default time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

impl Session {
    pub fn scheduled(id: impl Into<String>, date: NaiveDate, time: Option<&str>) -> Self {
        Self {
            id: id.into(),
            date,
            time: time.map(str::to_string),
            status: SessionStatus::Scheduled,
            duration_minutes: None,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.status == SessionStatus::Scheduled
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_session_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_duration_minutes: Option<u32>,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

impl Student {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            default_session_time: None,
            default_duration_minutes: None,
            sessions: Vec::new(),
        }
    }

    pub fn session(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == session_id)
    }
}

/// Look up a student by id in a snapshot.
pub fn find_student<'a>(students: &'a [Student], student_id: &str) -> Option<&'a Student> {
    students.iter().find(|s| s.id == student_id)
}
