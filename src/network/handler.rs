//! Command dispatch
//!
//! Maps decoded commands onto repository calls and repository errors onto
//! response statuses.

use crate::codec::Codec;
use crate::post::{CreatePostRequest, PostRepository, UpdatePostRequest};
use crate::protocol::{Command, Response};
use crate::store::KeyValueStore;

/// Executes one command and produces the response to send back
pub trait CommandHandler: Send + Sync {
    fn handle(&self, command: Command) -> Response;
}

impl<S, C> CommandHandler for PostRepository<S, C>
where
    S: KeyValueStore + ?Sized,
    C: Codec,
{
    fn handle(&self, command: Command) -> Response {
        let result = match command {
            Command::CreatePost { title, content } => self
                .create(&CreatePostRequest { title, content })
                .and_then(|post| Response::json(&post)),
            Command::GetPost { id } => self.get(&id).and_then(|post| Response::json(&post)),
            Command::UpdatePost { id, title, content } => self
                .update(&id, &UpdatePostRequest { title, content })
                .and_then(|post| Response::json(&post)),
            Command::DeletePost { id } => self.delete(&id).map(|()| Response::ok(None)),
            Command::ListPosts { cursor, limit } => self
                .list(cursor.as_deref(), limit)
                .and_then(|page| Response::json(&page)),
            Command::Ping => Response::json("PONG"),
        };

        result.unwrap_or_else(|err| {
            if err.status_code() >= 500 {
                tracing::error!(error = %err, "command failed");
            } else {
                tracing::debug!(error = %err, "command rejected");
            }
            Response::from_error(&err)
        })
    }
}
