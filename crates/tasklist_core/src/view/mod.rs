//! Read-only projections over the task collection.

pub mod filter_view;

pub use filter_view::{counts, select, TaskCounts};
