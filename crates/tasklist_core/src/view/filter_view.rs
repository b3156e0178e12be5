//! Filtered task views and aggregate counts.
//!
//! Both functions are pure and recompute from the collection on every call.

use crate::model::filter::FilterMode;
use crate::model::task::Task;
use serde::Serialize;

/// Aggregate counts over a task collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
}

impl TaskCounts {
    /// Number of tasks visible under `mode`.
    pub fn for_filter(&self, mode: FilterMode) -> usize {
        match mode {
            FilterMode::All => self.total,
            FilterMode::Pending => self.pending,
            FilterMode::Completed => self.completed,
        }
    }
}

/// Returns the tasks visible under `mode`, in collection order.
pub fn select(tasks: &[Task], mode: FilterMode) -> Vec<&Task> {
    tasks.iter().filter(|task| mode.matches(task)).collect()
}

/// Counts total, pending and completed tasks in one pass.
pub fn counts(tasks: &[Task]) -> TaskCounts {
    tasks
        .iter()
        .fold(TaskCounts::default(), |mut acc, task| {
            acc.total += 1;
            if task.completed {
                acc.completed += 1;
            } else {
                acc.pending += 1;
            }
            acc
        })
}
