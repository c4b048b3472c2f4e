//! Typed access over a byte store
//!
//! Pairs a `KeyValueStore` with a `Codec`. Encoding happens before a write
//! reaches the store and decoding after a read leaves it, so no lock is ever
//! held across (de)serialization.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Entry, KeyValueStore};
use crate::codec::{Codec, JsonCodec};
use crate::error::Result;

/// A store plus the codec used at its boundary
pub struct TypedStore<S: ?Sized, C = JsonCodec> {
    store: Arc<S>,
    codec: C,
}

impl<S: KeyValueStore + ?Sized, C: Codec> TypedStore<S, C> {
    pub fn new(store: Arc<S>, codec: C) -> Self {
        Self { store, codec }
    }

    /// The underlying byte store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Encode `value` and store it under `key`
    ///
    /// An encode failure returns before the store is touched, so the prior
    /// value stays intact.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let payload = self.codec.encode(value)?;
        self.store.set(key, payload)
    }

    /// Fetch `key` and decode it into `T`
    ///
    /// `NotFound` if absent, `Decode` if the payload does not fit `T`.
    pub fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let payload = self.store.get(key)?;
        self.codec.decode(&payload)
    }

    /// Snapshot every entry under `prefix` and decode each one
    ///
    /// The first payload that fails to decode fails the whole call.
    pub fn list<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>> {
        let entries = self.store.list(prefix)?;
        self.decode_entries(entries)
    }

    /// Like `list`, keeping each key alongside its value
    pub fn list_entries<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<(String, T)>> {
        self.store
            .list(prefix)?
            .into_iter()
            .map(|Entry { key, payload }| {
                let value = self.codec.decode(&payload)?;
                Ok((key, value))
            })
            .collect()
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        self.store.delete(key)
    }

    pub fn close(&self) -> Result<()> {
        self.store.close()
    }

    fn decode_entries<T: DeserializeOwned>(&self, entries: Vec<Entry>) -> Result<Vec<T>> {
        entries
            .iter()
            .map(|entry| {
                self.codec.decode(&entry.payload).map_err(|e| {
                    tracing::warn!(key = %entry.key, codec = self.codec.name(), "undecodable payload");
                    e
                })
            })
            .collect()
    }
}

impl<S: ?Sized, C: Clone> Clone for TypedStore<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            codec: self.codec.clone(),
        }
    }
}
