//! In-process slot store.

use super::{KeyValueStore, StorageError, StorageResult};
use std::collections::HashMap;

/// Map-backed store with an optional byte quota and a read-only switch.
///
/// Quota usage is the sum of key and value byte lengths across all slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
    quota_bytes: Option<usize>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes pushing usage above `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Makes every subsequent write fail with `StorageError::AccessDenied`.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn used_bytes(&self) -> usize {
        self.slots
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if self.read_only {
            return Err(StorageError::AccessDenied);
        }

        if let Some(quota) = self.quota_bytes {
            let replaced = self
                .slots
                .get(key)
                .map_or(0, |old| key.len() + old.len());
            let requested = self.used_bytes() - replaced + key.len() + value.len();
            if requested > quota {
                return Err(StorageError::QuotaExceeded { requested, quota });
            }
        }

        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        if self.read_only {
            return Err(StorageError::AccessDenied);
        }
        self.slots.remove(key);
        Ok(())
    }
}
