//! Paginator
//!
//! Turns a prefix snapshot into ordered, bounded pages.

use crate::codec::Codec;
use crate::error::{PostKvError, Result};
use crate::store::{KeyValueStore, TypedStore};

use super::{Cursor, Page, PageLimits, Paginated};

/// Produces pages from a store
///
/// Holds only the page-size policy; every call recomputes the view from a
/// fresh snapshot, so concurrent writes between pages are picked up.
#[derive(Debug, Clone, Copy, Default)]
pub struct Paginator {
    limits: PageLimits,
}

impl Paginator {
    pub fn new(limits: PageLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> PageLimits {
        self.limits
    }

    /// Fetch one page of `T` stored under `prefix`
    ///
    /// - `cursor`: `None` or `""` starts at the top of the listing
    /// - `limit`: `0` falls back to the cursor's limit, then the default
    ///
    /// A cursor naming an item that no longer exists fails with
    /// `Pagination` rather than resuming somewhere unrelated.
    pub fn page<T, S, C>(
        &self,
        store: &TypedStore<S, C>,
        prefix: &str,
        cursor: Option<&str>,
        limit: i64,
    ) -> Result<Page<T>>
    where
        T: Paginated,
        S: KeyValueStore + ?Sized,
        C: Codec,
    {
        let cursor = match cursor {
            Some(token) if !token.is_empty() => Some(Cursor::decode(token)?),
            _ => None,
        };

        let requested = match (&cursor, limit) {
            (Some(c), 0) => c.limit,
            _ => limit,
        };
        let limit = self.limits.clamp(requested);

        // Snapshot is taken and released inside `list`; sorting runs lock-free.
        let mut view: Vec<T> = store.list(prefix)?;
        view.sort_by(|a, b| a.ordering(b));

        let start = match &cursor {
            None => 0,
            Some(c) => {
                let index = view
                    .iter()
                    .position(|item| item.cursor_id() == c.id)
                    .ok_or_else(|| {
                        PostKvError::Pagination(format!(
                            "cursor references unknown item {}",
                            c.id
                        ))
                    })?;
                index + 1
            }
        };

        let end = start.saturating_add(limit).min(view.len());
        let has_more = end < view.len();

        let items: Vec<T> = view.drain(start.min(end)..end).collect();

        let next_cursor = match items.last() {
            Some(last) if has_more => {
                Some(Cursor::new(last.cursor_id(), limit as i64).encode()?)
            }
            _ => None,
        };

        tracing::debug!(
            prefix,
            start,
            returned = items.len(),
            has_more,
            "page"
        );

        Ok(Page { items, next_cursor })
    }
}
