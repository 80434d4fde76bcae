//! The host side of an apply: where accepted changes are written.
//!
//! The engine only proposes changes. A [`MutationSink`] is whatever owns the
//! real session records; [`Roster`] is an in-memory one over a snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::model::{Session, SessionStatus, Student};
use crate::undo::InverseMutation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeChangeOutcome {
    pub success: bool,
    pub updated_count: usize,
}

pub trait MutationSink {
    /// Change only the time of a session.
    fn apply_time_change(
        &mut self,
        student_id: &str,
        session_id: &str,
        new_time: &str,
    ) -> Result<TimeChangeOutcome>;

    /// Move a session to another date and time.
    fn apply_date_time_change(
        &mut self,
        student_id: &str,
        session_id: &str,
        new_date: NaiveDate,
        new_time: &str,
    ) -> Result<()>;

    fn set_status(&mut self, student_id: &str, session_id: &str, status: SessionStatus)
        -> Result<()>;

    /// Put a session back where an undo batch found it. Hosts that cannot
    /// store an absent time get the effective one.
    fn restore_slot(&mut self, restore: &InverseMutation) -> Result<()> {
        self.apply_date_time_change(
            &restore.student_id,
            &restore.session_id,
            restore.date,
            &restore.time,
        )
    }
}

/// An owned roster snapshot that applies mutations to itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    pub fn new(students: Vec<Student>) -> Self {
        Self { students }
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn into_students(self) -> Vec<Student> {
        self.students
    }

    pub fn session(&self, student_id: &str, session_id: &str) -> Option<&Session> {
        self.students
            .iter()
            .find(|s| s.id == student_id)
            .and_then(|s| s.session(session_id))
    }

    fn session_mut(&mut self, student_id: &str, session_id: &str) -> Result<&mut Session> {
        let student = self
            .students
            .iter_mut()
            .find(|s| s.id == student_id)
            .ok_or_else(|| EngineError::UnknownStudent(student_id.to_string()))?;
        student
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| EngineError::UnknownSession {
                student_id: student_id.to_string(),
                session_id: session_id.to_string(),
            })
    }
}

impl MutationSink for Roster {
    fn apply_time_change(
        &mut self,
        student_id: &str,
        session_id: &str,
        new_time: &str,
    ) -> Result<TimeChangeOutcome> {
        let session = self.session_mut(student_id, session_id)?;
        session.time = Some(new_time.to_string());
        Ok(TimeChangeOutcome {
            success: true,
            updated_count: 1,
        })
    }

    fn apply_date_time_change(
        &mut self,
        student_id: &str,
        session_id: &str,
        new_date: NaiveDate,
        new_time: &str,
    ) -> Result<()> {
        let session = self.session_mut(student_id, session_id)?;
        session.date = new_date;
        session.time = Some(new_time.to_string());
        Ok(())
    }

    fn set_status(
        &mut self,
        student_id: &str,
        session_id: &str,
        status: SessionStatus,
    ) -> Result<()> {
        self.session_mut(student_id, session_id)?.status = status;
        Ok(())
    }

    fn restore_slot(&mut self, restore: &InverseMutation) -> Result<()> {
        let session = self.session_mut(&restore.student_id, &restore.session_id)?;
        session.date = restore.date;
        session.time = restore.recorded_time.clone();
        Ok(())
    }
}

/// A host mutation that did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationFailure {
    pub student_id: String,
    pub session_id: String,
    pub message: String,
}
