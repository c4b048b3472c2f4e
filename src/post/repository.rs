//! Post repository
//!
//! CRUD for posts on top of a `TypedStore`. Owns the key convention
//! (`posts:<id>`) and turns store-level `NotFound` into `PostNotFound`.

use std::sync::Arc;

use crate::codec::{Codec, JsonCodec};
use crate::error::{PostKvError, Result};
use crate::pagination::{Page, Paginator};
use crate::store::{KeyValueStore, TypedStore};

use super::{generate_post_id, validate_post_id, CreatePostRequest, Post, UpdatePostRequest};

/// Key prefix shared by every stored post
pub const POST_PREFIX: &str = "posts:";

/// Stores and lists posts
pub struct PostRepository<S: ?Sized, C = JsonCodec> {
    store: TypedStore<S, C>,
    paginator: Paginator,
}

impl<S: KeyValueStore + ?Sized, C: Codec> PostRepository<S, C> {
    pub fn new(store: Arc<S>, codec: C, paginator: Paginator) -> Self {
        Self {
            store: TypedStore::new(store, codec),
            paginator,
        }
    }

    /// The typed store backing this repository
    pub fn store(&self) -> &TypedStore<S, C> {
        &self.store
    }

    /// Validate, assign an id, and store a new post
    pub fn create(&self, request: &CreatePostRequest) -> Result<Post> {
        request.validate()?;

        let post = Post::new(generate_post_id(), &request.title, &request.content);
        self.store.set(&post_key(&post.id), &post)?;

        tracing::debug!(id = %post.id, "post created");
        Ok(post)
    }

    pub fn get(&self, id: &str) -> Result<Post> {
        validate_post_id(id)?;
        self.store
            .get_typed(&post_key(id))
            .map_err(|e| not_found_as_post(e, id))
    }

    /// Replace title and content of an existing post
    ///
    /// Read-modify-write across two store calls: concurrent updates to the
    /// same post are last-writer-wins.
    pub fn update(&self, id: &str, request: &UpdatePostRequest) -> Result<Post> {
        validate_post_id(id)?;
        request.validate()?;

        let key = post_key(id);
        let mut post: Post = self
            .store
            .get_typed(&key)
            .map_err(|e| not_found_as_post(e, id))?;

        post.update(&request.title, &request.content);
        self.store.set(&key, &post)?;

        tracing::debug!(id, "post updated");
        Ok(post)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        validate_post_id(id)?;
        self.store
            .delete(&post_key(id))
            .map_err(|e| not_found_as_post(e, id))?;

        tracing::debug!(id, "post deleted");
        Ok(())
    }

    /// One page of posts, newest first
    pub fn list(&self, cursor: Option<&str>, limit: i64) -> Result<Page<Post>> {
        self.paginator.page(&self.store, POST_PREFIX, cursor, limit)
    }

    /// Drop every stored entry
    pub fn close(&self) -> Result<()> {
        self.store.close()
    }
}

/// Storage key for a post id
pub fn post_key(id: &str) -> String {
    format!("{}{}", POST_PREFIX, id)
}

fn not_found_as_post(err: PostKvError, id: &str) -> PostKvError {
    match err {
        PostKvError::NotFound(_) => PostKvError::PostNotFound(id.to_string()),
        other => other,
    }
}
