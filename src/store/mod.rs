//! Store Module
//!
//! String-keyed storage of opaque byte payloads.
//!
//! ## Responsibilities
//! - Atomic set/replace, get and delete per key
//! - Prefix listing as a single consistent snapshot
//! - Distinguished `NotFound` so callers branch without string matching
//!
//! ## Key Convention
//! Keys are opaque apart from `"<collection>:<id>"`, which is what prefix
//! scans are built around (e.g. `"posts:"` lists every post).
//!
//! ## Layers
//! ```text
//!   TypedStore<S, C>   values  <-> Codec  <-> bytes
//!         │
//!         ▼
//!   KeyValueStore      bytes only, one RwLock (MemoryStore)
//! ```

mod memory;
mod typed;

pub use memory::MemoryStore;
pub use typed::TypedStore;

use bytes::Bytes;

use crate::error::{PostKvError, Result};

/// One key/payload pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub payload: Bytes,
}

/// Contract every storage backend honours
///
/// All methods take `&self`; implementations handle their own locking.
pub trait KeyValueStore: Send + Sync {
    /// Store `payload` under `key`, replacing any previous value
    ///
    /// Empty keys fail with `InvalidKey`. Concurrent readers see either the
    /// old or the new payload, never a mix.
    fn set(&self, key: &str, payload: Bytes) -> Result<()>;

    /// Fetch the payload for `key`, or `NotFound`
    fn get(&self, key: &str) -> Result<Bytes>;

    /// Every live entry whose key starts with `prefix`, taken at one instant
    ///
    /// The empty prefix lists the whole store. Order is unspecified.
    fn list(&self, prefix: &str) -> Result<Vec<Entry>>;

    /// Remove `key`, or `NotFound` if it is absent
    fn delete(&self, key: &str) -> Result<()>;

    /// Discard every entry. Idempotent.
    fn close(&self) -> Result<()>;
}

/// Reject keys no backend may store
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(PostKvError::InvalidKey("key cannot be empty".to_string()));
    }
    Ok(())
}
