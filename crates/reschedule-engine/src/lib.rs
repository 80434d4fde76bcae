//! # reschedule-engine
//!
//! Bulk rescheduling and conflict classification for a tutor's recurring
//! student sessions.
//!
//! Given a roster snapshot, one student, a set of calendar periods and a
//! modification rule, the engine computes each affected session's new slot,
//! checks it against every other session on that day, and sorts the changes
//! into safe, warning and conflict buckets. Applying commits only safe (and
//! optionally warning) changes through a host-provided sink and records a
//! single-slot, time-limited undo batch. Nothing here persists sessions.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use reschedule_engine::{Direction, ModificationRule, Period, RescheduleEngine, Session, Student};
//!
//! let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
//! let mut student = Student::new("x", "Xavier");
//! student.sessions.push(Session::scheduled("x1", monday, Some("16:00")));
//!
//! let engine = RescheduleEngine::default();
//! let preview = engine
//!     .preview(
//!         &[student],
//!         "x",
//!         &[Period::week_of(monday)],
//!         &ModificationRule::offset(Direction::Later, 1, 0),
//!     )
//!     .unwrap();
//! assert_eq!(preview.safe[0].change.new_time, "17:00");
//! ```
//!
//! ## Modules
//!
//! - [`time`] — `HH:MM` ↔ minutes with midnight wraparound, effective time
//! - [`period`] — week/month/custom periods and union membership
//! - [`rule`] — modification rules and their validation
//! - [`selector`] — eligible sessions for a rule
//! - [`compute`] — new date/time per session
//! - [`conflict`] — severity of a proposed slot
//! - [`categorize`] — safe / warning / conflict partition
//! - [`undo`] — single-slot undo with TTL and pluggable storage
//! - [`engine`] — preview, apply, single moves, vacation marking
//! - [`freebusy`] — free windows in a day
//! - [`recurrence`] — RRULE → sessions
//! - [`sink`] — host mutation boundary and in-memory roster
//! - [`config`], [`clock`], [`model`], [`error`]

pub mod categorize;
pub mod clock;
pub mod compute;
pub mod config;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod freebusy;
pub mod model;
pub mod period;
pub mod recurrence;
pub mod rule;
pub mod selector;
pub mod sink;
pub mod time;
pub mod undo;
pub mod vacation;

pub use categorize::{categorize, Categorization, ClassifiedChange};
pub use clock::{Clock, ManualClock, SystemClock};
pub use compute::{compute_candidates, CandidateChange};
pub use config::EngineConfig;
pub use conflict::{detect_conflict, ConflictInfo, Severity};
pub use engine::{ApplyReport, ApplyScope, MoveOutcome, RescheduleEngine, VacationReport};
pub use error::EngineError;
pub use model::{Session, SessionStatus, Student};
pub use period::{is_in_any_period, Period, PeriodKind, PeriodSelection};
pub use rule::{Direction, ModificationRule};
pub use selector::select_sessions;
pub use sink::{MutationSink, Roster};
pub use undo::{FileStore, MemoryStore, UndoManager, UndoRecord, UndoStore};
