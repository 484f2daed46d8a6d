use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use tracing::debug;

use crate::errors::StoreError;

use super::{KeyValueStore, Result};

/// Process-local store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.into(), value.into());
        }
        store
    }

    /// Returns the raw value for `key` without going through the async API.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.lock().ok().and_then(|entries| entries.get(key).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.lock()?.get(key).cloned();
        debug!(key, found = value.is_some(), "memory store read");
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        debug!(key, bytes = value.len(), "memory store write");
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }
}
