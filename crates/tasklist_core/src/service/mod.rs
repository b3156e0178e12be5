//! Core use-case services.
//!
//! # Responsibility
//! - Own live task state and orchestrate persistence after each change.
//! - Keep presentation callers decoupled from storage details.

pub mod task_store;

pub use task_store::{Committed, LoadOutcome, StoreResult, TaskStore, TaskStoreError};
