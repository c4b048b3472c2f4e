//! In-memory store implementation
//!
//! HashMap-based store with a single RwLock for concurrency.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;

use super::{validate_key, Entry, KeyValueStore};
use crate::error::{PostKvError, Result};

/// In-memory key-value store
///
/// ## Concurrency:
/// - `data`: one store-wide RwLock
/// - `set` / `delete` / `close` take the write lock
/// - `get` / `list` / `len` / `contains` take the read lock
///
/// Payloads are immutable `Bytes`, so `list` only clones reference-counted
/// handles while holding the lock. Decoding happens after it is released.
pub struct MemoryStore {
    data: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Check if the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Check whether `key` has a live entry
    pub fn contains(&self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        self.data.read().contains_key(key)
    }

    /// Keys starting with `prefix`, unordered
    pub fn list_keys(&self, prefix: &str) -> Vec<String> {
        self.data
            .read()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn set(&self, key: &str, payload: Bytes) -> Result<()> {
        validate_key(key)?;

        let len = payload.len();
        self.data.write().insert(key.to_string(), payload);

        tracing::trace!(key, bytes = len, "set");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Bytes> {
        validate_key(key)?;

        let payload = self.data.read().get(key).cloned();
        payload.ok_or_else(|| PostKvError::NotFound(key.to_string()))
    }

    fn list(&self, prefix: &str) -> Result<Vec<Entry>> {
        let entries: Vec<Entry> = {
            let data = self.data.read();
            data.iter()
                .filter(|(k, _)| k.starts_with(prefix))
                .map(|(k, v)| Entry {
                    key: k.clone(),
                    payload: v.clone(),
                })
                .collect()
        };

        tracing::trace!(prefix, count = entries.len(), "list");
        Ok(entries)
    }

    fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;

        match self.data.write().remove(key) {
            Some(_) => {
                tracing::trace!(key, "delete");
                Ok(())
            }
            None => Err(PostKvError::NotFound(key.to_string())),
        }
    }

    fn close(&self) -> Result<()> {
        let mut data = self.data.write();
        let dropped = data.len();
        *data = HashMap::new();

        tracing::debug!(dropped, "store closed");
        Ok(())
    }
}
