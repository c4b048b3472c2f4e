//! Pagination Module
//!
//! Stateless cursor pagination over an unordered store.
//!
//! ## How a page is produced
//! 1. Snapshot every entry under a key prefix
//! 2. Decode and sort by a total order (`Paginated::ordering`)
//! 3. Resume just after the item named by the cursor
//! 4. Emit `limit` items and, if more remain, a cursor naming the last one
//!
//! No cursor state lives on the server. A cursor is only meaningful against
//! the ordering that issued it.

mod cursor;
mod paginator;

pub use cursor::Cursor;
pub use paginator::Paginator;

use std::cmp::Ordering;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Page size used when the caller gives none
pub const DEFAULT_LIMIT: usize = 20;

/// Hard cap on page size
pub const MAX_LIMIT: usize = 100;

/// Smallest page a caller can get
pub const MIN_LIMIT: usize = 1;

/// Values that can be listed page by page
pub trait Paginated: DeserializeOwned {
    /// Identity recorded in cursors; must be unique within a listing
    fn cursor_id(&self) -> &str;

    /// Total order of the listing
    ///
    /// Must never return `Equal` for two distinct items, or pages stop being
    /// reproducible.
    fn ordering(&self, other: &Self) -> Ordering;
}

/// Default and maximum page sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

impl PageLimits {
    /// Normalize a requested page size
    ///
    /// - `0` means "unspecified" and yields the default
    /// - negative values are raised to 1
    /// - anything above the maximum is capped
    pub fn clamp(&self, requested: i64) -> usize {
        if requested == 0 {
            return self.default_limit.clamp(MIN_LIMIT, self.max_limit.max(MIN_LIMIT));
        }
        if requested < MIN_LIMIT as i64 {
            return MIN_LIMIT;
        }
        let max = self.max_limit.max(MIN_LIMIT);
        usize::try_from(requested).map_or(max, |n| n.min(max))
    }
}

/// One bounded slice of a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// True when another page follows
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
