//! Snapshot persistence over a durable slot store.
//!
//! # Responsibility
//! - Serialize the full task state into one string slot.
//! - Read it back through the typed decode boundary.
//!
//! # Invariants
//! - A failed save is reported once and never retried here.
//! - `load` never hands out partially decoded state.

use crate::config::StoreConfig;
use crate::model::filter::FilterMode;
use crate::model::snapshot::{decode_snapshot, DecodeError, PersistedSnapshot, SnapshotRecord};
use crate::model::task::{now_millis, Task};
use crate::storage::{KeyValueStore, StorageError};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Failure while writing or reading the persisted snapshot.
#[derive(Debug)]
pub enum PersistenceError {
    /// The store rejected the write.
    StorageWrite(StorageError),
    /// The store failed to return the slot.
    StorageRead(StorageError),
    /// The slot holds a document that does not decode into a snapshot.
    Corrupt(DecodeError),
    Encode(serde_json::Error),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageWrite(err) => write!(f, "failed to save tasks: {err}"),
            Self::StorageRead(err) => write!(f, "failed to read saved tasks: {err}"),
            Self::Corrupt(err) => write!(f, "saved task data is corrupt: {err}"),
            Self::Encode(err) => write!(f, "failed to encode tasks: {err}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageWrite(err) | Self::StorageRead(err) => Some(err),
            Self::Corrupt(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

/// Owns the durable store and the slot key the snapshot lives under.
pub struct PersistenceGateway<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> PersistenceGateway<S> {
    pub fn new(store: S, config: &StoreConfig) -> Self {
        Self::with_key(store, config.storage_key.clone())
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Writes `tasks` and `filter` as one snapshot stamped with the current time.
    ///
    /// Returns the `lastUpdated` value that was written.
    pub fn save(
        &mut self,
        tasks: &[Task],
        current_filter: FilterMode,
    ) -> PersistenceResult<DateTime<Utc>> {
        let last_updated = now_millis();
        self.write(&SnapshotRecord {
            tasks,
            current_filter,
            last_updated,
        })?;
        Ok(last_updated)
    }

    /// Writes an owned snapshot, keeping its `last_updated` when present.
    pub fn save_snapshot(&mut self, snapshot: &PersistedSnapshot) -> PersistenceResult<()> {
        self.write(&SnapshotRecord {
            tasks: snapshot.tasks.as_slice(),
            current_filter: snapshot.current_filter,
            last_updated: snapshot.last_updated.unwrap_or_else(now_millis),
        })
    }

    /// Reads the stored snapshot.
    ///
    /// Returns `Ok(None)` on first run (empty slot).
    pub fn load(&self) -> PersistenceResult<Option<PersistedSnapshot>> {
        let raw = match self.store.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("event=snapshot_load module=persistence status=empty");
                return Ok(None);
            }
            Err(err) => {
                error!(
                    "event=snapshot_load module=persistence status=error error_code=storage_read_failed error={}",
                    err
                );
                return Err(PersistenceError::StorageRead(err));
            }
        };

        match decode_snapshot(&raw) {
            Ok(snapshot) => {
                info!(
                    "event=snapshot_load module=persistence status=ok tasks={} filter={}",
                    snapshot.tasks.len(),
                    snapshot.current_filter
                );
                Ok(Some(snapshot))
            }
            Err(err) => {
                warn!(
                    "event=snapshot_load module=persistence status=error error_code=corrupt_data bytes={} error={}",
                    raw.len(),
                    err
                );
                Err(PersistenceError::Corrupt(err))
            }
        }
    }

    /// Removes the stored snapshot.
    pub fn clear(&mut self) -> PersistenceResult<()> {
        self.store
            .remove_item(&self.key)
            .map_err(PersistenceError::StorageWrite)
    }

    fn write(&mut self, record: &SnapshotRecord<'_>) -> PersistenceResult<()> {
        let payload = serde_json::to_string(record).map_err(PersistenceError::Encode)?;
        match self.store.set_item(&self.key, &payload) {
            Ok(()) => {
                debug!(
                    "event=snapshot_save module=persistence status=ok tasks={} bytes={}",
                    record.tasks.len(),
                    payload.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=snapshot_save module=persistence status=error error_code=storage_write_failed tasks={} bytes={} error={}",
                    record.tasks.len(),
                    payload.len(),
                    err
                );
                Err(PersistenceError::StorageWrite(err))
            }
        }
    }
}
