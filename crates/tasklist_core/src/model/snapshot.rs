//! Durable snapshot shape and the typed JSON decode boundary.
//!
//! # Responsibility
//! - Define the persisted `{ tasks, currentFilter, lastUpdated }` document.
//! - Convert untyped JSON (storage slot or import payload) into `Task` values.
//!
//! # Invariants
//! - Decoded collections never contain empty or duplicate task IDs.
//! - Timestamps present on the wire must be valid RFC 3339 with a year in
//!   0000..=9999, so every decoded timestamp can be written back.
//! - An unusable `currentFilter` falls back to `all`; it never discards tasks.
//! - Decoding never re-validates task text; that is the caller's policy.

use crate::model::filter::{FilterMode, ParseFilterModeError};
use crate::model::task::{
    is_wire_timestamp, now_millis, parse_timestamp, serialize_timestamp, Task, TaskId,
};
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Full persisted state: tasks, filter mode and last write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSnapshot {
    pub tasks: Vec<Task>,
    pub current_filter: FilterMode,
    /// `None` when the stored document carried no `lastUpdated` field.
    pub last_updated: Option<DateTime<Utc>>,
}

impl PersistedSnapshot {
    pub fn new(tasks: Vec<Task>, current_filter: FilterMode) -> Self {
        Self {
            tasks,
            current_filter,
            last_updated: None,
        }
    }
}

/// Borrowed serialization view used for writes, so saves never clone tasks.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SnapshotRecord<'a> {
    pub tasks: &'a [Task],
    pub current_filter: FilterMode,
    #[serde(serialize_with = "serialize_timestamp")]
    pub last_updated: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    tasks: Vec<WireTask>,
    #[serde(default)]
    current_filter: Option<serde_json::Value>,
    #[serde(default)]
    last_updated: Option<String>,
}

/// Task as it appears in stored or imported JSON.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireTask {
    id: String,
    text: String,
    completed: bool,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

/// Why a JSON document could not be turned into typed task data.
#[derive(Debug)]
pub enum DecodeError {
    /// Input is not syntactically valid JSON.
    Syntax(serde_json::Error),
    /// JSON is valid but required fields are missing or have the wrong type.
    Shape(serde_json::Error),
    EmptyTaskId {
        index: usize,
    },
    DuplicateTaskId(TaskId),
    InvalidTimestamp {
        field: &'static str,
        value: String,
    },
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax(err) => write!(f, "invalid JSON: {err}"),
            Self::Shape(err) => write!(f, "unexpected document shape: {err}"),
            Self::EmptyTaskId { index } => write!(f, "task at index {index} has an empty id"),
            Self::DuplicateTaskId(id) => write!(f, "duplicate task id `{id}`"),
            Self::InvalidTimestamp { field, value } => {
                write!(f, "invalid timestamp `{value}` in field `{field}`")
            }
        }
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Syntax(err) | Self::Shape(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(value: serde_json::Error) -> Self {
        if value.is_data() {
            Self::Shape(value)
        } else {
            Self::Syntax(value)
        }
    }
}

/// Decodes a stored snapshot document.
pub fn decode_snapshot(raw: &str) -> Result<PersistedSnapshot, DecodeError> {
    let snapshot: RawSnapshot = serde_json::from_str(raw)?;
    let tasks = decode_tasks(snapshot.tasks)?;
    let last_updated = snapshot
        .last_updated
        .as_deref()
        .map(|value| decode_timestamp("lastUpdated", value))
        .transpose()?;

    Ok(PersistedSnapshot {
        tasks,
        current_filter: decode_filter(snapshot.current_filter),
        last_updated,
    })
}

/// Converts wire tasks into domain tasks, preserving order.
///
/// Missing timestamps are filled with the decode time; a missing `updatedAt`
/// falls back to `createdAt`.
pub(crate) fn decode_tasks(wire: Vec<WireTask>) -> Result<Vec<Task>, DecodeError> {
    let now = now_millis();
    let mut seen = HashSet::with_capacity(wire.len());
    let mut tasks = Vec::with_capacity(wire.len());

    for (index, item) in wire.into_iter().enumerate() {
        if item.id.trim().is_empty() {
            return Err(DecodeError::EmptyTaskId { index });
        }
        if !seen.insert(item.id.clone()) {
            return Err(DecodeError::DuplicateTaskId(TaskId::from(item.id)));
        }

        let created_at = match item.created_at.as_deref() {
            Some(value) => decode_timestamp("createdAt", value)?,
            None => now,
        };
        let updated_at = match item.updated_at.as_deref() {
            Some(value) => decode_timestamp("updatedAt", value)?,
            None => created_at,
        };

        tasks.push(Task::from_parts(
            TaskId::from(item.id),
            item.text,
            item.completed,
            created_at,
            updated_at,
        ));
    }

    Ok(tasks)
}

fn decode_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, DecodeError> {
    match parse_timestamp(value) {
        Ok(parsed) if is_wire_timestamp(&parsed) => Ok(parsed),
        _ => Err(DecodeError::InvalidTimestamp {
            field,
            value: value.to_string(),
        }),
    }
}

fn decode_filter(raw: Option<serde_json::Value>) -> FilterMode {
    let parsed = match raw {
        None | Some(serde_json::Value::Null) => return FilterMode::default(),
        Some(serde_json::Value::String(value)) if value.trim().is_empty() => {
            return FilterMode::default()
        }
        Some(serde_json::Value::String(value)) => value.parse::<FilterMode>(),
        Some(other) => Err(ParseFilterModeError(other.to_string())),
    };

    parsed.unwrap_or_else(|err| {
        warn!(
            "event=snapshot_decode module=model status=fallback field=currentFilter fallback=all error={}",
            err
        );
        FilterMode::default()
    })
}

#[cfg(test)]
mod tests {
    use super::{decode_snapshot, DecodeError};
    use crate::model::filter::FilterMode;

    #[test]
    fn missing_filter_defaults_to_all() {
        let snapshot = decode_snapshot(r#"{"tasks":[]}"#).unwrap();
        assert_eq!(snapshot.current_filter, FilterMode::All);
        assert!(snapshot.last_updated.is_none());
    }

    #[test]
    fn classifies_syntax_and_shape_errors() {
        assert!(matches!(
            decode_snapshot("{bad").unwrap_err(),
            DecodeError::Syntax(_)
        ));
        assert!(matches!(
            decode_snapshot(r#"{"tasks":"nope"}"#).unwrap_err(),
            DecodeError::Shape(_)
        ));
    }

    #[test]
    fn rejects_timestamps_past_year_9999() {
        let err = decode_snapshot(
            r#"{"tasks":[{"id":"a","text":"x","completed":false,"createdAt":"9999-12-31T23:59:59.999-01:00"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidTimestamp {
                field: "createdAt",
                ..
            }
        ));
    }

    #[test]
    fn missing_updated_at_falls_back_to_created_at() {
        let snapshot = decode_snapshot(
            r#"{"tasks":[{"id":"a","text":"x","completed":false,"createdAt":"2026-01-02T03:04:05.006Z"}]}"#,
        )
        .unwrap();
        let task = &snapshot.tasks[0];
        assert_eq!(task.created_at, task.updated_at);
    }
}
