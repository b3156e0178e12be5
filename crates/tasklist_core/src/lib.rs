//! Core state management for a single-user task list.
//! This crate is the single source of truth for task invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod service;
pub mod storage;
pub mod transfer;
pub mod view;

pub use config::{default_log_level, ConfigError, LogConfig, StoreConfig, DEFAULT_STORAGE_KEY};
pub use logging::{init_logging, logging_status, LoggingError};
pub use model::filter::{FilterMode, ParseFilterModeError};
pub use model::snapshot::{decode_snapshot, DecodeError, PersistedSnapshot};
pub use model::task::{
    format_timestamp, is_wire_timestamp, normalize_task_text, parse_timestamp, Task, TaskId,
    TaskValidationError, MAX_TASK_TEXT_CHARS,
};
pub use persistence::{PersistenceError, PersistenceGateway, PersistenceResult};
pub use service::{Committed, LoadOutcome, StoreResult, TaskStore, TaskStoreError};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, StorageError, StorageResult};
pub use transfer::{
    export_snapshot, import_snapshot, ImportMode, TransferError, EXPORT_FORMAT_VERSION,
};
pub use view::{counts, select, TaskCounts};
