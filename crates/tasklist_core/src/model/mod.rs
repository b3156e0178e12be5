//! Task domain model and its durable JSON shape.
//!
//! # Responsibility
//! - Define canonical data structures used by the task store.
//! - Own the single parse-and-validate boundary for untyped JSON input.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId` assigned at creation.
//! - Task text written through the store is trimmed and 1..=200 chars.

pub mod filter;
pub mod snapshot;
pub mod task;
