//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record owned by the task store.
//! - Normalize and validate user-entered task text.
//! - Provide millisecond timestamps with a stable ISO-8601 wire form.
//!
//! # Invariants
//! - `id` is assigned once and never changes for the task lifetime.
//! - `text` produced by `normalize_task_text` is trimmed and 1..=200 chars.
//! - `updated_at` strictly increases on every `touch` until it reaches
//!   `9999-12-31T23:59:59.999Z`, the last instant RFC 3339 can express.

use chrono::{DateTime, Datelike, SecondsFormat, SubsecRound, Utc};
use serde::{Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Maximum task text length, counted in Unicode scalar values after trimming.
pub const MAX_TASK_TEXT_CHARS: usize = 200;

// 9999-12-31T23:59:59.999Z
const MAX_WIRE_TIMESTAMP_MILLIS: i64 = 253_402_300_799_999;

/// Opaque task identifier.
///
/// Generated IDs are UUID v4 strings; imported IDs keep whatever non-empty
/// string the payload carried.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for TaskId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TaskId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Rejection reasons for task text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Text is empty after trimming.
    Empty,
    /// Text exceeds `MAX_TASK_TEXT_CHARS` after trimming.
    TooLong { len: usize, max: usize },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "task text must not be empty"),
            Self::TooLong { len, max } => {
                write!(f, "task text has {len} characters; at most {max} allowed")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Trims `raw` and checks the text length invariant.
///
/// Returns the trimmed text ready to be stored.
pub fn normalize_task_text(raw: &str) -> Result<String, TaskValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::Empty);
    }

    let len = trimmed.chars().count();
    if len > MAX_TASK_TEXT_CHARS {
        return Err(TaskValidationError::TooLong {
            len,
            max: MAX_TASK_TEXT_CHARS,
        });
    }

    Ok(trimmed.to_string())
}

/// Current UTC time truncated to the millisecond precision used on the wire.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Formats a timestamp as RFC 3339 with millisecond fraction and `Z` suffix.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an RFC 3339 timestamp in any offset into UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw.trim()).map(|value| value.with_timezone(&Utc))
}

/// Whether `value` has a four-digit year and survives a format/parse round trip.
pub fn is_wire_timestamp(value: &DateTime<Utc>) -> bool {
    (0..=9999).contains(&value.year())
}

pub(crate) fn serialize_timestamp<S: Serializer>(
    value: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(value))
}

/// One to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a pending task with a generated ID from user-entered text.
    ///
    /// # Errors
    /// - Returns `TaskValidationError` when the trimmed text breaks the length invariant.
    pub fn new(text: &str) -> Result<Self, TaskValidationError> {
        let text = normalize_task_text(text)?;
        let now = now_millis();
        Ok(Self {
            id: TaskId::generate(),
            text,
            completed: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a task from already-decoded parts.
    ///
    /// Used by the storage and import paths. Does not validate `text`.
    pub fn from_parts(
        id: TaskId,
        text: impl Into<String>,
        completed: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            completed,
            created_at,
            updated_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.completed
    }

    /// Refreshes `updated_at`, moving it forward by at least 1ms.
    ///
    /// Saturates at the latest timestamp the wire format can carry.
    pub fn touch(&mut self) {
        let next = self
            .updated_at
            .timestamp_millis()
            .saturating_add(1)
            .max(now_millis().timestamp_millis())
            .min(MAX_WIRE_TIMESTAMP_MILLIS);
        if let Some(value) = DateTime::from_timestamp_millis(next) {
            self.updated_at = value;
        }
    }

    pub(crate) fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
        self.touch();
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.text = text;
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, is_wire_timestamp, parse_timestamp, Task};

    #[test]
    fn timestamp_format_uses_millis_and_z_suffix() {
        let parsed = parse_timestamp("2026-10-18T09:30:00.123+02:00").unwrap();
        assert_eq!(format_timestamp(&parsed), "2026-10-18T07:30:00.123Z");
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn wire_timestamps_are_limited_to_four_digit_years() {
        assert!(is_wire_timestamp(
            &parse_timestamp("9999-12-31T23:59:59.999Z").unwrap()
        ));
        assert!(!is_wire_timestamp(
            &parse_timestamp("9999-12-31T23:59:59.999-01:00").unwrap()
        ));
        assert!(!is_wire_timestamp(
            &parse_timestamp("0000-01-01T00:00:00.000+01:00").unwrap()
        ));
    }

    #[test]
    fn touch_saturates_at_latest_wire_timestamp() {
        let latest = parse_timestamp("9999-12-31T23:59:59.999Z").unwrap();
        let mut task = Task::new("far future").unwrap();
        task.updated_at = latest;

        task.touch();

        assert_eq!(task.updated_at, latest);
        assert_eq!(format_timestamp(&task.updated_at), "9999-12-31T23:59:59.999Z");
    }
}
