//! Pagination Tests
//!
//! Tests verify:
//! - Ordering (newest first, id tie-break)
//! - Cursor continuation and end-of-list
//! - Stale, malformed and tampered cursors
//! - Limit clamping on requests and on cursors
//! - Coverage across arbitrary data sets and page sizes

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use postkv::post::{post_key, POST_PREFIX};
use postkv::{Cursor, JsonCodec, MemoryStore, Page, PageLimits, Paginator, Post, PostKvError, TypedStore};
use proptest::prelude::*;

// =============================================================================
// Helper Functions
// =============================================================================

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

fn store() -> TypedStore<MemoryStore> {
    TypedStore::new(Arc::new(MemoryStore::new()), JsonCodec)
}

fn insert(store: &TypedStore<MemoryStore>, id: &str, at: DateTime<Utc>) {
    let post = Post::with_created_at(id, format!("title {}", id), "content", at);
    store.set(&post_key(id), &post).unwrap();
}

fn page(store: &TypedStore<MemoryStore>, cursor: Option<&str>, limit: i64) -> postkv::Result<Page<Post>> {
    Paginator::default().page(store, POST_PREFIX, cursor, limit)
}

fn ids(page: &Page<Post>) -> Vec<&str> {
    page.items.iter().map(|p| p.id.as_str()).collect()
}

/// A (T1), B (T2 > T1), C (T3 > T2)
fn abc_store() -> TypedStore<MemoryStore> {
    let s = store();
    insert(&s, "A", base_time());
    insert(&s, "B", base_time() + Duration::seconds(1));
    insert(&s, "C", base_time() + Duration::seconds(2));
    s
}

/// Follow cursors to the end, returning every page
fn walk(store: &TypedStore<MemoryStore>, limit: i64) -> Vec<Page<Post>> {
    let mut pages = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let p = page(store, cursor.as_deref(), limit).unwrap();
        cursor = p.next_cursor.clone();
        pages.push(p);
        if cursor.is_none() {
            return pages;
        }
        assert!(pages.len() < 10_000, "pagination did not terminate");
    }
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[test]
fn test_two_pages_newest_first() {
    let s = abc_store();

    let first = page(&s, None, 2).unwrap();
    assert_eq!(ids(&first), vec!["C", "B"]);
    let token = first.next_cursor.clone().expect("first page must have a cursor");
    assert_eq!(Cursor::decode(&token).unwrap(), Cursor::new("B", 2));

    let second = page(&s, Some(&token), 2).unwrap();
    assert_eq!(ids(&second), vec!["A"]);
    assert!(second.next_cursor.is_none());
    assert!(!second.has_more());
}

#[test]
fn test_empty_cursor_string_starts_at_top() {
    let s = abc_store();
    let p = page(&s, Some(""), 2).unwrap();
    assert_eq!(ids(&p), vec!["C", "B"]);
}

#[test]
fn test_deleted_cursor_item_is_pagination_error() {
    let s = abc_store();
    let first = page(&s, None, 2).unwrap();
    let token = first.next_cursor.unwrap();

    s.delete(&post_key("B")).unwrap();

    let result = page(&s, Some(&token), 2);
    assert!(matches!(result, Err(PostKvError::Pagination(_))));
}

#[test]
fn test_insert_between_pages_does_not_duplicate() {
    let s = abc_store();
    let first = page(&s, None, 2).unwrap();

    // Newer than everything: lands before the cursor, not on the next page
    insert(&s, "D", base_time() + Duration::seconds(10));

    let second = page(&s, first.next_cursor.as_deref(), 2).unwrap();
    assert_eq!(ids(&second), vec!["A"]);
}

#[test]
fn test_exact_fit_has_no_cursor() {
    let s = abc_store();
    let p = page(&s, None, 3).unwrap();
    assert_eq!(ids(&p), vec!["C", "B", "A"]);
    assert!(p.next_cursor.is_none());
}

#[test]
fn test_empty_store_yields_empty_page() {
    let s = store();
    let p = page(&s, None, 10).unwrap();
    assert!(p.is_empty());
    assert!(p.next_cursor.is_none());
}

#[test]
fn test_other_prefixes_excluded() {
    let s = abc_store();
    s.set("drafts:X", &Post::new("X", "t", "c")).unwrap();
    let p = page(&s, None, 10).unwrap();
    assert_eq!(ids(&p), vec!["C", "B", "A"]);
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_equal_timestamps_break_ties_by_id() {
    let s = store();
    for id in ["d", "b", "a", "c"] {
        insert(&s, id, base_time());
    }

    let first = page(&s, None, 2).unwrap();
    assert_eq!(ids(&first), vec!["a", "b"]);
    let second = page(&s, first.next_cursor.as_deref(), 2).unwrap();
    assert_eq!(ids(&second), vec!["c", "d"]);
    assert!(second.next_cursor.is_none());
}

// =============================================================================
// Cursor Validation Tests
// =============================================================================

#[test]
fn test_malformed_cursors_rejected() {
    let s = abc_store();
    for bad in ["!!!", "not-a-cursor", "AAAA", "eyJpZCI6IkIiLCJsaW1pdCI6Mn0"] {
        let result = page(&s, Some(bad), 2);
        assert!(
            matches!(result, Err(PostKvError::Pagination(_))),
            "cursor {:?} should be rejected",
            bad
        );
    }
}

#[test]
fn test_tampered_cursor_rejected() {
    let s = abc_store();
    let token = page(&s, None, 2).unwrap().next_cursor.unwrap();

    let mut chars: Vec<char> = token.chars().collect();
    let mid = chars.len() / 2;
    chars[mid] = if chars[mid] == 'A' { 'B' } else { 'A' };
    let tampered: String = chars.into_iter().collect();

    let result = page(&s, Some(&tampered), 2);
    assert!(matches!(result, Err(PostKvError::Pagination(_))));

    let truncated = &token[..token.len() - 3];
    assert!(matches!(page(&s, Some(truncated), 2), Err(PostKvError::Pagination(_))));
}

#[test]
fn test_cursor_round_trip() {
    let cursor = Cursor::new("post-abc", 25);
    let token = cursor.encode().unwrap();
    assert_eq!(Cursor::decode(&token).unwrap(), cursor);
}

// =============================================================================
// Limit Tests
// =============================================================================

fn many_posts(n: usize) -> TypedStore<MemoryStore> {
    let s = store();
    for i in 0..n {
        insert(&s, &format!("p{:04}", i), base_time() + Duration::seconds(i as i64));
    }
    s
}

#[test]
fn test_zero_limit_uses_default() {
    let s = many_posts(50);
    let p = page(&s, None, 0).unwrap();
    assert_eq!(p.len(), 20);
    assert!(p.has_more());
}

#[test]
fn test_large_limit_capped() {
    let s = many_posts(150);
    let p = page(&s, None, 1000).unwrap();
    assert_eq!(p.len(), 100);
    let cursor = Cursor::decode(p.next_cursor.as_deref().unwrap()).unwrap();
    assert_eq!(cursor.limit, 100);
}

#[test]
fn test_negative_limit_behaves_as_one() {
    let s = many_posts(5);
    let negative = page(&s, None, -5).unwrap();
    let one = page(&s, None, 1).unwrap();
    assert_eq!(negative.len(), 1);
    assert_eq!(negative, one);
}

#[test]
fn test_cursor_limit_used_when_request_limit_unspecified() {
    let s = many_posts(10);
    let first = page(&s, None, 3).unwrap();
    let second = page(&s, first.next_cursor.as_deref(), 0).unwrap();
    assert_eq!(second.len(), 3);
}

#[test]
fn test_cursor_limit_is_clamped_too() {
    let s = many_posts(150);
    let newest = "p0149";
    let token = Cursor::new(newest, 5000).encode().unwrap();

    let p = page(&s, Some(&token), 0).unwrap();
    assert_eq!(p.len(), 100);
    assert_eq!(p.items[0].id, "p0148");
}

#[test]
fn test_custom_page_limits() {
    let s = many_posts(30);
    let paginator = Paginator::new(PageLimits {
        default_limit: 4,
        max_limit: 6,
    });

    assert_eq!(paginator.page::<Post, _, _>(&s, POST_PREFIX, None, 0).unwrap().len(), 4);
    assert_eq!(paginator.page::<Post, _, _>(&s, POST_PREFIX, None, 50).unwrap().len(), 6);
}

// =============================================================================
// Coverage Tests
// =============================================================================

#[test]
fn test_walk_covers_everything_in_order() {
    let s = many_posts(57);
    let pages = walk(&s, 10);
    assert_eq!(pages.len(), 6);

    let all: Vec<Post> = pages.into_iter().flat_map(|p| p.items).collect();
    assert_eq!(all.len(), 57);
    for pair in all.windows(2) {
        assert!(pair[0].created_at > pair[1].created_at);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_pagination_covers_all_posts_once(
        offsets in proptest::collection::vec(0i64..20, 0..60),
        limit in 1i64..15,
    ) {
        // Small offset range forces plenty of equal timestamps.
        let s = store();
        for (i, offset) in offsets.iter().enumerate() {
            insert(&s, &format!("id-{:03}", i), base_time() + Duration::seconds(*offset));
        }

        let all: Vec<Post> = walk(&s, limit).into_iter().flat_map(|p| p.items).collect();

        prop_assert_eq!(all.len(), offsets.len());
        let unique: HashSet<&str> = all.iter().map(|p| p.id.as_str()).collect();
        prop_assert_eq!(unique.len(), offsets.len());

        for pair in all.windows(2) {
            prop_assert!(pair[0].created_at >= pair[1].created_at);
            if pair[0].created_at == pair[1].created_at {
                prop_assert!(pair[0].id < pair[1].id);
            }
        }
    }
}
