//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! yields the behaviour the tutor app ships with.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Session time used when neither the session nor its student records one.
pub const DEFAULT_SESSION_TIME: &str = "16:00";

/// Session length used when nothing more specific is recorded.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Whether a candidate colliding with another session of the *same* student
/// counts as a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfConflictPolicy {
    /// Same-student overlap is a blocking error like any other.
    #[default]
    Error,
    /// Same-student sessions are skipped while scanning.
    Ignore,
}

/// Which duration the conflict scan assumes for each session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictDuration {
    /// Every session is `default_duration_minutes` long.
    #[default]
    Fixed,
    /// Use each session's own duration, then its student's default.
    PerSession,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_session_time: String,
    pub default_duration_minutes: u32,
    /// Gaps strictly between 0 and this many minutes are near misses.
    pub warning_gap_minutes: u32,
    /// How far a session's time may drift from a day-change source slot and
    /// still be treated as the same recurring slot.
    pub day_change_tolerance_minutes: u32,
    pub undo_ttl_seconds: u64,
    pub self_conflicts: SelfConflictPolicy,
    pub conflict_duration: ConflictDuration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_session_time: DEFAULT_SESSION_TIME.to_string(),
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
            warning_gap_minutes: 15,
            day_change_tolerance_minutes: 30,
            undo_ttl_seconds: 600,
            self_conflicts: SelfConflictPolicy::Error,
            conflict_duration: ConflictDuration::Fixed,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn undo_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.undo_ttl_seconds as i64)
    }
}
