//! Partition candidates by conflict severity.

use serde::{Deserialize, Serialize};

use crate::compute::CandidateChange;
use crate::config::EngineConfig;
use crate::conflict::{detect_conflict, ConflictInfo, Severity};
use crate::model::Student;

/// A candidate together with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedChange {
    #[serde(flatten)]
    pub change: CandidateChange,
    pub conflict: ConflictInfo,
}

/// Candidates split into the three buckets, each in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Categorization {
    pub safe: Vec<ClassifiedChange>,
    pub warnings: Vec<ClassifiedChange>,
    pub conflicts: Vec<ClassifiedChange>,
}

impl Categorization {
    pub fn len(&self) -> usize {
        self.safe.len() + self.warnings.len() + self.conflicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Classify each candidate against the snapshot and bucket it.
pub fn categorize(
    students: &[Student],
    candidates: Vec<CandidateChange>,
    config: &EngineConfig,
) -> Categorization {
    let mut out = Categorization::default();
    for change in candidates {
        let conflict = detect_conflict(
            students,
            &change.student_id,
            &change.session_id,
            change.new_date,
            &change.new_time,
            config,
        );
        let bucket = match conflict.severity {
            Severity::None => &mut out.safe,
            Severity::Warning => &mut out.warnings,
            Severity::Error => &mut out.conflicts,
        };
        bucket.push(ClassifiedChange { change, conflict });
    }
    out
}
