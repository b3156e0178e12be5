//! Task store: the owned, authoritative task state.
//!
//! # Responsibility
//! - Apply add/edit/toggle/delete and bulk mutations to the collection.
//! - Save the full snapshot after every state change.
//! - Rehydrate from storage at startup, recovering from unreadable data.
//!
//! # Invariants
//! - New tasks are prepended; edits and toggles never reorder.
//! - Task IDs are unique within the collection.
//! - Invalid input is rejected before any state changes.
//! - A failed save never rolls back memory; the store stays usable and
//!   reports itself as unsynced until a later save succeeds.

use crate::config::StoreConfig;
use crate::model::filter::FilterMode;
use crate::model::task::{normalize_task_text, Task, TaskId, TaskValidationError};
use crate::persistence::{PersistenceError, PersistenceGateway};
use crate::storage::KeyValueStore;
use crate::transfer::{export_snapshot, import_snapshot, ImportMode, TransferError};
use crate::view::{counts, select, TaskCounts};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, TaskStoreError>;

/// Rejection of a store operation. State is unchanged when one is returned.
#[derive(Debug)]
pub enum TaskStoreError {
    Validation(TaskValidationError),
    NotFound(TaskId),
    Transfer(TransferError),
}

impl Display for TaskStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Transfer(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Transfer(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for TaskStoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<TransferError> for TaskStoreError {
    fn from(value: TransferError) -> Self {
        Self::Transfer(value)
    }
}

/// Result of an applied mutation.
///
/// `value` is always the post-mutation result. `save_error` is set when the
/// change is live in memory but could not be written to durable storage.
#[derive(Debug)]
#[must_use = "a failed save is only reported through `save_error`"]
pub struct Committed<T> {
    pub value: T,
    pub save_error: Option<PersistenceError>,
}

impl<T> Committed<T> {
    pub fn is_saved(&self) -> bool {
        self.save_error.is_none()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// How startup state was obtained.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Constructed from caller-provided state; storage was not read.
    Injected,
    /// No stored snapshot existed.
    FirstRun,
    /// The stored snapshot was loaded.
    Restored { tasks: usize },
    /// Stored data could not be read; the store started empty.
    Recovered(PersistenceError),
}

/// Owned task state plus the gateway it persists through.
pub struct TaskStore<S: KeyValueStore> {
    tasks: Vec<Task>,
    filter: FilterMode,
    gateway: PersistenceGateway<S>,
    import_mode: ImportMode,
    synced: bool,
    load_outcome: LoadOutcome,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Builds a store from explicit initial state without touching storage.
    ///
    /// Duplicate IDs in `tasks` are dropped, keeping the first occurrence. The
    /// store starts unsynced until the first save.
    pub fn new(
        tasks: Vec<Task>,
        filter: FilterMode,
        gateway: PersistenceGateway<S>,
        config: &StoreConfig,
    ) -> Self {
        let mut seen = std::collections::HashSet::with_capacity(tasks.len());
        let tasks = tasks
            .into_iter()
            .filter(|task| seen.insert(task.id.clone()))
            .collect();
        Self {
            tasks,
            filter,
            gateway,
            import_mode: config.import_mode,
            synced: false,
            load_outcome: LoadOutcome::Injected,
        }
    }

    /// Rehydrates the store from `store` using `config`.
    ///
    /// Never fails: unreadable or corrupt data yields an empty collection with
    /// `FilterMode::All`, and the cause is kept in `load_outcome()`.
    pub fn open(store: S, config: &StoreConfig) -> Self {
        let gateway = PersistenceGateway::new(store, config);
        let (tasks, filter, load_outcome) = match gateway.load() {
            Ok(Some(snapshot)) => {
                let count = snapshot.tasks.len();
                (
                    snapshot.tasks,
                    snapshot.current_filter,
                    LoadOutcome::Restored { tasks: count },
                )
            }
            Ok(None) => (Vec::new(), FilterMode::All, LoadOutcome::FirstRun),
            Err(err) => {
                warn!(
                    "event=store_open module=service status=recovered fallback=empty error={}",
                    err
                );
                (Vec::new(), FilterMode::All, LoadOutcome::Recovered(err))
            }
        };

        let synced = matches!(
            load_outcome,
            LoadOutcome::Restored { .. } | LoadOutcome::FirstRun
        );
        info!(
            "event=store_open module=service status=ok tasks={} filter={}",
            tasks.len(),
            filter
        );
        Self {
            tasks,
            filter,
            gateway,
            import_mode: config.import_mode,
            synced,
            load_outcome,
        }
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    /// Full collection, newest first.
    pub fn tasks(&self) -> &[Task] {
        self.tasks.as_slice()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    /// Tasks visible under the current filter.
    pub fn visible(&self) -> Vec<&Task> {
        select(&self.tasks, self.filter)
    }

    pub fn counts(&self) -> TaskCounts {
        counts(&self.tasks)
    }

    /// Whether durable storage reflects the current in-memory state.
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn gateway(&self) -> &PersistenceGateway<S> {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut PersistenceGateway<S> {
        &mut self.gateway
    }

    /// Creates a task from `text` and puts it first.
    pub fn add(&mut self, text: &str) -> StoreResult<Committed<Task>> {
        let mut task = Task::new(text)?;
        while self.position(task.id.as_str()).is_some() {
            task.id = TaskId::generate();
        }

        self.tasks.insert(0, task.clone());
        info!("event=task_add module=service status=ok task_id={}", task.id);
        Ok(self.commit(task))
    }

    /// Removes a task and returns it.
    pub fn delete(&mut self, id: &str) -> StoreResult<Committed<Task>> {
        let index = self.require(id)?;
        let removed = self.tasks.remove(index);
        info!(
            "event=task_delete module=service status=ok task_id={}",
            removed.id
        );
        Ok(self.commit(removed))
    }

    /// Flips completion of one task.
    pub fn toggle(&mut self, id: &str) -> StoreResult<Committed<Task>> {
        let index = self.require(id)?;
        let task = &mut self.tasks[index];
        task.set_completed(!task.completed);
        let updated = task.clone();
        info!(
            "event=task_toggle module=service status=ok task_id={} completed={}",
            updated.id, updated.completed
        );
        Ok(self.commit(updated))
    }

    /// Replaces the text of one task. Text is validated before lookup.
    pub fn edit(&mut self, id: &str, new_text: &str) -> StoreResult<Committed<Task>> {
        let text = normalize_task_text(new_text)?;
        let index = self.require(id)?;
        let task = &mut self.tasks[index];
        task.set_text(text);
        let updated = task.clone();
        info!(
            "event=task_edit module=service status=ok task_id={}",
            updated.id
        );
        Ok(self.commit(updated))
    }

    /// Completes every pending task. Returns how many changed.
    pub fn mark_all_complete(&mut self) -> Committed<usize> {
        self.set_all_completed(true)
    }

    /// Reopens every completed task. Returns how many changed.
    pub fn mark_all_incomplete(&mut self) -> Committed<usize> {
        self.set_all_completed(false)
    }

    /// Removes every completed task. Returns how many were removed.
    pub fn clear_completed(&mut self) -> Committed<usize> {
        let before = self.tasks.len();
        self.tasks.retain(Task::is_pending);
        let removed = before - self.tasks.len();
        info!("event=tasks_clear_completed module=service status=ok count={removed}");
        self.commit_if_changed(removed)
    }

    /// Removes every task. Returns how many were removed.
    pub fn clear_all(&mut self) -> Committed<usize> {
        let removed = self.tasks.len();
        self.tasks.clear();
        info!("event=tasks_clear_all module=service status=ok count={removed}");
        self.commit_if_changed(removed)
    }

    /// Switches the current filter and persists it.
    pub fn set_filter(&mut self, mode: FilterMode) -> Committed<FilterMode> {
        if self.filter == mode {
            return Committed {
                value: mode,
                save_error: None,
            };
        }
        self.filter = mode;
        self.commit(mode)
    }

    /// Exports the whole collection as a versioned JSON document.
    pub fn export(&self) -> StoreResult<String> {
        Ok(export_snapshot(&self.tasks)?)
    }

    /// Replaces the collection with an imported payload.
    ///
    /// On error the current collection is left untouched. Returns the number of
    /// imported tasks.
    pub fn import(&mut self, raw: &str) -> StoreResult<Committed<usize>> {
        let tasks = match import_snapshot(raw, self.import_mode) {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(
                    "event=tasks_import module=service status=error bytes={} error={}",
                    raw.len(),
                    err
                );
                return Err(err.into());
            }
        };

        let count = tasks.len();
        self.tasks = tasks;
        info!("event=tasks_import module=service status=ok count={count}");
        Ok(self.commit(count))
    }

    /// Writes the current state regardless of whether anything changed.
    pub fn flush(&mut self) -> Result<(), PersistenceError> {
        match self.persist() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn set_all_completed(&mut self, completed: bool) -> Committed<usize> {
        let mut changed = 0;
        for task in self
            .tasks
            .iter_mut()
            .filter(|task| task.completed != completed)
        {
            task.set_completed(completed);
            changed += 1;
        }
        info!(
            "event=tasks_mark_all module=service status=ok completed={completed} count={changed}"
        );
        self.commit_if_changed(changed)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn require(&self, id: &str) -> StoreResult<usize> {
        self.position(id)
            .ok_or_else(|| TaskStoreError::NotFound(TaskId::from(id)))
    }

    fn commit_if_changed(&mut self, count: usize) -> Committed<usize> {
        if count == 0 {
            return Committed {
                value: 0,
                save_error: None,
            };
        }
        self.commit(count)
    }

    fn commit<T>(&mut self, value: T) -> Committed<T> {
        Committed {
            value,
            save_error: self.persist(),
        }
    }

    fn persist(&mut self) -> Option<PersistenceError> {
        match self.gateway.save(&self.tasks, self.filter) {
            Ok(_) => {
                self.synced = true;
                None
            }
            Err(err) => {
                warn!(
                    "event=store_persist module=service status=unsynced tasks={} error={}",
                    self.tasks.len(),
                    err
                );
                self.synced = false;
                Some(err)
            }
        }
    }
}
