//! User-initiated import and export of task collections.

pub mod import_export;

pub use import_export::{
    export_snapshot, import_snapshot, ImportMode, TransferError, EXPORT_FORMAT_VERSION,
};
