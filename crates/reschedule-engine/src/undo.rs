//! Single-slot undo for the last applied batch.
//!
//! Applying a batch snapshots every affected session's original date and
//! time. The snapshot lives for a fixed TTL in one slot (a newer batch
//! replaces it) and is mirrored to an [`UndoStore`] so it survives a restart
//! within the TTL. Expiry is checked on every access against an injected
//! [`Clock`]; [`UndoManager::tick`] only exists to drive a countdown.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::Result;
use crate::sink::{MutationFailure, MutationSink};

/// Key under which the active record is persisted.
pub const UNDO_STORE_KEY: &str = "reschedule.undo";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoEntry {
    pub session_id: String,
    pub student_id: String,
    pub original_date: NaiveDate,
    /// Effective time before the batch.
    pub original_time: String,
    /// The stored time before the batch; `None` restores a session that
    /// followed its student's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoRecord {
    pub entries: Vec<UndoEntry>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl UndoRecord {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }

    /// Mutations restoring every entry's original slot.
    pub fn inverse(&self) -> Vec<InverseMutation> {
        self.entries
            .iter()
            .map(|e| InverseMutation {
                student_id: e.student_id.clone(),
                session_id: e.session_id.clone(),
                date: e.original_date,
                time: e.original_time.clone(),
                recorded_time: e.recorded_time.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InverseMutation {
    pub student_id: String,
    pub session_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub recorded_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoReport {
    pub restored: usize,
    pub failed: Vec<MutationFailure>,
}

/// String key-value storage for the undo slot.
pub trait UndoStore {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UndoStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        std::fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl UndoStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

pub struct UndoManager<S, C> {
    store: S,
    clock: C,
    ttl: Duration,
    current: Option<UndoRecord>,
}

impl<S: UndoStore, C: Clock> UndoManager<S, C> {
    /// Create a manager, rehydrating a persisted record that is still live.
    /// An expired or unreadable persisted record is discarded.
    pub fn new(store: S, clock: C, ttl: Duration) -> Result<Self> {
        let mut manager = Self {
            store,
            clock,
            ttl,
            current: None,
        };
        if let Some(raw) = manager.store.load(UNDO_STORE_KEY)? {
            match serde_json::from_str::<UndoRecord>(&raw) {
                Ok(record) if record.is_active(manager.clock.now()) => {
                    debug!(entries = record.entries.len(), "rehydrated undo record");
                    manager.current = Some(record);
                }
                Ok(_) => {
                    debug!("discarding expired undo record");
                    manager.store.remove(UNDO_STORE_KEY)?;
                }
                Err(e) => {
                    warn!(error = %e, "discarding unreadable undo record");
                    manager.store.remove(UNDO_STORE_KEY)?;
                }
            }
        }
        Ok(manager)
    }

    /// Snapshot a batch about to be committed, replacing any active record.
    pub fn begin_batch(&mut self, entries: Vec<UndoEntry>) -> Result<UndoRecord> {
        let now = self.clock.now();
        let record = UndoRecord {
            entries,
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.store
            .save(UNDO_STORE_KEY, &serde_json::to_string(&record)?)?;
        if self.current.is_some() {
            debug!("replacing previous undo record");
        }
        info!(entries = record.entries.len(), expires_at = %record.expires_at, "undo batch recorded");
        self.current = Some(record.clone());
        Ok(record)
    }

    /// The active record, if one exists and has not expired.
    pub fn active(&self) -> Option<&UndoRecord> {
        let now = self.clock.now();
        self.current.as_ref().filter(|r| r.is_active(now))
    }

    /// Drop the record once expired; returns the time left on a live one.
    pub fn tick(&mut self) -> Result<Option<Duration>> {
        let now = self.clock.now();
        match &self.current {
            Some(record) if record.is_active(now) => Ok(Some(record.remaining(now))),
            Some(_) => {
                info!("undo record expired");
                self.clear()?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Consume the active record and return its inverse mutations.
    ///
    /// Returns `None` when there is nothing live to undo. The record is gone
    /// after this call whatever the caller does with the mutations.
    pub fn take_undo(&mut self) -> Result<Option<Vec<InverseMutation>>> {
        let live = self.active().is_some();
        self.store.remove(UNDO_STORE_KEY)?;
        let record = self.current.take();
        Ok(record.filter(|_| live).map(|r| r.inverse()))
    }

    /// Replay the inverse of the active batch through `sink`, once.
    ///
    /// Failures are collected, not retried.
    pub fn undo(&mut self, sink: &mut dyn MutationSink) -> Result<Option<UndoReport>> {
        let Some(mutations) = self.take_undo()? else {
            debug!("nothing to undo");
            return Ok(None);
        };
        let mut report = UndoReport::default();
        for m in mutations {
            match sink.restore_slot(&m) {
                Ok(()) => report.restored += 1,
                Err(e) => {
                    warn!(session_id = %m.session_id, error = %e, "undo mutation failed");
                    report.failed.push(MutationFailure {
                        student_id: m.student_id,
                        session_id: m.session_id,
                        message: e.to_string(),
                    });
                }
            }
        }
        info!(restored = report.restored, failed = report.failed.len(), "undo replayed");
        Ok(Some(report))
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(UNDO_STORE_KEY)?;
        self.current = None;
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
