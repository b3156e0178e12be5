//! Visibility filter selection.

use crate::model::task::Task;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Active visibility filter, persisted alongside tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Every task.
    #[default]
    All,
    /// Tasks with `completed == false`.
    Pending,
    /// Tasks with `completed == true`.
    Completed,
}

impl FilterMode {
    /// All modes in display order.
    pub const ALL: [FilterMode; 3] = [FilterMode::All, FilterMode::Pending, FilterMode::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Returns whether `task` is visible under this mode.
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

impl Display for FilterMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown filter name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFilterModeError(pub String);

impl Display for ParseFilterModeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown filter mode `{}`; expected all|pending|completed",
            self.0
        )
    }
}

impl Error for ParseFilterModeError {}

impl FromStr for FilterMode {
    type Err = ParseFilterModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(ParseFilterModeError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FilterMode;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(" Pending ".parse::<FilterMode>().unwrap(), FilterMode::Pending);
        assert!("done".parse::<FilterMode>().is_err());
    }

    #[test]
    fn default_is_all() {
        assert_eq!(FilterMode::default(), FilterMode::All);
    }
}
