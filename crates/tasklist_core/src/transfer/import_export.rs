//! Versioned JSON export and validated import.
//!
//! # Responsibility
//! - Render the task collection as a portable `{ tasks, exportDate, version }` document.
//! - Turn an external payload into a typed collection ready to replace live state.
//!
//! # Invariants
//! - A failed import returns an error and produces no partial collection.
//! - `ImportMode::Strict` applies the same text rules as `TaskStore::add`.

use crate::model::snapshot::{decode_tasks, DecodeError, WireTask};
use crate::model::task::{
    normalize_task_text, now_millis, serialize_timestamp, Task, TaskId, TaskValidationError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Format version written into every export document.
pub const EXPORT_FORMAT_VERSION: &str = "1.0.0";

/// How imported task text is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportMode {
    /// Accept structurally valid tasks as-is, including text outside 1..=200 chars.
    #[default]
    Lenient,
    /// Trim and validate every task text; the first violation rejects the payload.
    Strict,
}

/// Import or export failure.
#[derive(Debug)]
pub enum TransferError {
    /// Payload is not JSON, lacks a `tasks` sequence, or holds malformed tasks.
    Malformed(DecodeError),
    /// Strict mode found task text that `TaskStore::add` would refuse.
    Rejected {
        task_id: TaskId,
        reason: TaskValidationError,
    },
    Encode(serde_json::Error),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed import payload: {err}"),
            Self::Rejected { task_id, reason } => {
                write!(f, "imported task `{task_id}` rejected: {reason}")
            }
            Self::Encode(err) => write!(f, "failed to encode export: {err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            Self::Rejected { reason, .. } => Some(reason),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<DecodeError> for TransferError {
    fn from(value: DecodeError) -> Self {
        Self::Malformed(value)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRecord<'a> {
    tasks: &'a [Task],
    #[serde(serialize_with = "serialize_timestamp")]
    export_date: DateTime<Utc>,
    version: &'static str,
}

#[derive(Deserialize)]
struct ImportRecord {
    tasks: Vec<WireTask>,
}

/// Renders `tasks` as a pretty-printed, versioned export document.
pub fn export_snapshot(tasks: &[Task]) -> Result<String, TransferError> {
    let record = ExportRecord {
        tasks,
        export_date: now_millis(),
        version: EXPORT_FORMAT_VERSION,
    };
    serde_json::to_string_pretty(&record).map_err(TransferError::Encode)
}

/// Parses an export document (or any object with a `tasks` array) into tasks.
///
/// Fields other than `tasks` are ignored, including `version`.
pub fn import_snapshot(raw: &str, mode: ImportMode) -> Result<Vec<Task>, TransferError> {
    let record: ImportRecord = serde_json::from_str(raw).map_err(DecodeError::from)?;
    let mut tasks = decode_tasks(record.tasks)?;

    if mode == ImportMode::Strict {
        for task in &mut tasks {
            task.text = normalize_task_text(&task.text).map_err(|reason| {
                TransferError::Rejected {
                    task_id: task.id.clone(),
                    reason,
                }
            })?;
        }
    }

    Ok(tasks)
}
