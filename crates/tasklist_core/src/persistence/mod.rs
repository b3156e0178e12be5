//! Persistence of the task snapshot into durable storage.
//!
//! # Invariants
//! - Only this module reads or writes the snapshot slot.
//! - Stored data passes the `model::snapshot` decode boundary before use.

pub mod gateway;

pub use gateway::{PersistenceError, PersistenceGateway, PersistenceResult};
