//! # postkv
//!
//! A blog-post store built around a concurrent in-memory key-value engine:
//! - String-keyed byte store behind a single reader/writer lock
//! - Pluggable payload codecs (JSON, bincode)
//! - Stateless cursor pagination over prefix snapshots
//! - Framed TCP protocol for post CRUD
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Worker Thread Pool)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  PostRepository                              │
//! │          (validation, ids, posts:<id> keys)                  │
//! └──────────┬──────────────────────────────┬───────────────────┘
//!            │                              │
//!            ▼                              ▼
//!   ┌─────────────────┐            ┌─────────────────┐
//!   │   TypedStore    │◄───────────│    Paginator    │
//!   │ (Codec boundary)│            │ (sort + cursor) │
//!   └────────┬────────┘            └─────────────────┘
//!            │
//!            ▼
//!   ┌─────────────────┐
//!   │   MemoryStore   │
//!   │    (RwLock)     │
//!   └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod store;
pub mod pagination;
pub mod post;
pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{PostKvError, Result};
pub use config::Config;
pub use codec::{BincodeCodec, Codec, CodecKind, JsonCodec};
pub use store::{KeyValueStore, MemoryStore, TypedStore};
pub use pagination::{Cursor, Page, PageLimits, Paginator};
pub use post::{Post, PostRepository};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of postkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
