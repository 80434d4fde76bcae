//! The bulk-edit pipeline: validate, select, compute, classify, apply.
//!
//! [`RescheduleEngine`] is what the edit dialog, the calendar's drag-and-drop
//! and the vacation dialog share. Previewing is pure; applying hands each
//! accepted change to the host's [`MutationSink`] and records an undo batch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::categorize::{categorize, Categorization, ClassifiedChange};
use crate::clock::Clock;
use crate::compute::compute_candidates;
use crate::config::EngineConfig;
use crate::conflict::{detect_conflict, ConflictInfo};
use crate::error::{EngineError, Result};
use crate::model::{find_student, SessionStatus, Student};
use crate::period::Period;
use crate::rule::ModificationRule;
use crate::selector::select_sessions;
use crate::sink::{MutationFailure, MutationSink};
use crate::time::{effective_time, parse_time};
use crate::undo::{UndoEntry, UndoManager, UndoRecord, UndoStore};
use crate::vacation::plan_vacation;

/// Which buckets an apply commits. Conflicts are never applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyScope {
    #[default]
    SafeOnly,
    SafeAndWarnings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    pub applied: usize,
    pub failed: Vec<MutationFailure>,
    pub skipped_warnings: usize,
    pub skipped_conflicts: usize,
    /// The undo batch recorded for this apply, if anything was attempted.
    pub undo: Option<UndoRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub conflict: ConflictInfo,
    pub applied: bool,
    pub undo: Option<UndoRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationReport {
    pub marked: usize,
    pub failed: Vec<MutationFailure>,
}

#[derive(Debug, Clone, Default)]
pub struct RescheduleEngine {
    config: EngineConfig,
}

impl RescheduleEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute and classify the changes `rule` would make to one student's
    /// sessions inside `periods`.
    ///
    /// An empty result is not an error; it means no session matched.
    ///
    /// # Errors
    /// Configuration errors only: an invalid rule, no periods, or an unknown
    /// student.
    pub fn preview(
        &self,
        students: &[Student],
        student_id: &str,
        periods: &[Period],
        rule: &ModificationRule,
    ) -> Result<Categorization> {
        rule.validate()?;
        if periods.is_empty() {
            return Err(EngineError::NoPeriods);
        }
        let student = find_student(students, student_id)
            .ok_or_else(|| EngineError::UnknownStudent(student_id.to_string()))?;

        let eligible = select_sessions(student, periods, rule, &self.config);
        let candidates = compute_candidates(student, &eligible, rule, &self.config);
        let result = categorize(students, candidates, &self.config);

        debug!(
            student_id,
            eligible = eligible.len(),
            safe = result.safe.len(),
            warnings = result.warnings.len(),
            conflicts = result.conflicts.len(),
            "preview computed"
        );
        Ok(result)
    }

    /// Commit the accepted buckets of a preview through `sink`.
    ///
    /// Changes that move the date go through
    /// [`MutationSink::apply_date_time_change`], the rest through
    /// [`MutationSink::apply_time_change`]. The undo snapshot is taken before
    /// the first mutation and covers every accepted change. Individual host
    /// failures are reported and do not stop the remaining changes.
    pub fn apply<S: UndoStore, C: Clock>(
        &self,
        preview: &Categorization,
        scope: ApplyScope,
        sink: &mut dyn MutationSink,
        undo: &mut UndoManager<S, C>,
    ) -> Result<ApplyReport> {
        let mut accepted: Vec<&ClassifiedChange> = preview.safe.iter().collect();
        let mut report = ApplyReport {
            skipped_conflicts: preview.conflicts.len(),
            ..ApplyReport::default()
        };
        match scope {
            ApplyScope::SafeAndWarnings => accepted.extend(preview.warnings.iter()),
            ApplyScope::SafeOnly => report.skipped_warnings = preview.warnings.len(),
        }

        if accepted.is_empty() {
            debug!("nothing to apply");
            return Ok(report);
        }

        let entries = accepted
            .iter()
            .map(|c| UndoEntry {
                session_id: c.change.session_id.clone(),
                student_id: c.change.student_id.clone(),
                original_date: c.change.original_date,
                original_time: c.change.original_time.clone(),
                recorded_time: c.change.recorded_time.clone(),
            })
            .collect();
        report.undo = Some(undo.begin_batch(entries)?);

        for classified in accepted {
            let c = &classified.change;
            let outcome = if c.moves_date() {
                sink.apply_date_time_change(&c.student_id, &c.session_id, c.new_date, &c.new_time)
            } else {
                sink.apply_time_change(&c.student_id, &c.session_id, &c.new_time)
                    .and_then(|o| {
                        if o.success {
                            Ok(())
                        } else {
                            Err(EngineError::Mutation {
                                session_id: c.session_id.clone(),
                                message: "host reported no update".to_string(),
                            })
                        }
                    })
            };
            match outcome {
                Ok(()) => report.applied += 1,
                Err(e) => {
                    warn!(session_id = %c.session_id, error = %e, "apply failed");
                    report.failed.push(MutationFailure {
                        student_id: c.student_id.clone(),
                        session_id: c.session_id.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            applied = report.applied,
            failed = report.failed.len(),
            skipped_warnings = report.skipped_warnings,
            skipped_conflicts = report.skipped_conflicts,
            "batch applied"
        );
        Ok(report)
    }

    /// Classify dropping one session onto a new slot.
    ///
    /// # Errors
    /// Unknown student or session, a session that is not scheduled, or an
    /// invalid `new_time`.
    pub fn evaluate_move(
        &self,
        students: &[Student],
        student_id: &str,
        session_id: &str,
        new_date: NaiveDate,
        new_time: &str,
    ) -> Result<ConflictInfo> {
        parse_time(new_time)?;
        let student = find_student(students, student_id)
            .ok_or_else(|| EngineError::UnknownStudent(student_id.to_string()))?;
        let session = student
            .session(session_id)
            .ok_or_else(|| EngineError::UnknownSession {
                student_id: student_id.to_string(),
                session_id: session_id.to_string(),
            })?;
        if !session.is_scheduled() {
            return Err(EngineError::NotScheduled(session_id.to_string()));
        }
        Ok(detect_conflict(
            students,
            student_id,
            session_id,
            new_date,
            new_time,
            &self.config,
        ))
    }

    /// Move one session unless the new slot is blocked, recording a
    /// single-entry undo batch when it moves.
    #[allow(clippy::too_many_arguments)]
    pub fn move_session<S: UndoStore, C: Clock>(
        &self,
        students: &[Student],
        student_id: &str,
        session_id: &str,
        new_date: NaiveDate,
        new_time: &str,
        sink: &mut dyn MutationSink,
        undo: &mut UndoManager<S, C>,
    ) -> Result<MoveOutcome> {
        let conflict = self.evaluate_move(students, student_id, session_id, new_date, new_time)?;
        if conflict.is_blocking() {
            debug!(session_id, "move blocked by conflict");
            return Ok(MoveOutcome {
                conflict,
                applied: false,
                undo: None,
            });
        }

        // evaluate_move has already resolved both ids.
        let (student, session) = find_student(students, student_id)
            .and_then(|st| st.session(session_id).map(|s| (st, s)))
            .ok_or_else(|| EngineError::UnknownStudent(student_id.to_string()))?;
        let original_time = effective_time(session, student, &self.config).to_string();
        let record = undo.begin_batch(vec![UndoEntry {
            session_id: session_id.to_string(),
            student_id: student_id.to_string(),
            original_date: session.date,
            original_time,
            recorded_time: session.time.clone(),
        }])?;

        if new_date == session.date {
            let outcome = sink.apply_time_change(student_id, session_id, new_time)?;
            if !outcome.success {
                return Err(EngineError::Mutation {
                    session_id: session_id.to_string(),
                    message: "host reported no update".to_string(),
                });
            }
        } else {
            sink.apply_date_time_change(student_id, session_id, new_date, new_time)?;
        }

        info!(session_id, %new_date, new_time, "session moved");
        Ok(MoveOutcome {
            conflict,
            applied: true,
            undo: Some(record),
        })
    }

    /// Mark every scheduled session of a student inside `periods` as vacation.
    pub fn mark_vacation(
        &self,
        students: &[Student],
        student_id: &str,
        periods: &[Period],
        sink: &mut dyn MutationSink,
    ) -> Result<VacationReport> {
        if periods.is_empty() {
            return Err(EngineError::NoPeriods);
        }
        let student = find_student(students, student_id)
            .ok_or_else(|| EngineError::UnknownStudent(student_id.to_string()))?;

        let mut report = VacationReport::default();
        for candidate in plan_vacation(student, periods, &self.config) {
            match sink.set_status(student_id, &candidate.session_id, SessionStatus::Vacation) {
                Ok(()) => report.marked += 1,
                Err(e) => {
                    warn!(session_id = %candidate.session_id, error = %e, "vacation mark failed");
                    report.failed.push(MutationFailure {
                        student_id: student_id.to_string(),
                        session_id: candidate.session_id,
                        message: e.to_string(),
                    });
                }
            }
        }
        info!(student_id, marked = report.marked, "vacation marked");
        Ok(report)
    }
}
