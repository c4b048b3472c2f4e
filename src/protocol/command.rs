//! Command definitions
//!
//! Represents requests from clients.

use serde::{Deserialize, Serialize};

use crate::error::{PostKvError, Result};

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    CreatePost = 0x01,
    GetPost = 0x02,
    UpdatePost = 0x03,
    DeletePost = 0x04,
    ListPosts = 0x05,
    Ping = 0x06,
}

impl TryFrom<u8> for CommandType {
    type Error = PostKvError;

    fn try_from(byte: u8) -> Result<Self> {
        match byte {
            0x01 => Ok(Self::CreatePost),
            0x02 => Ok(Self::GetPost),
            0x03 => Ok(Self::UpdatePost),
            0x04 => Ok(Self::DeletePost),
            0x05 => Ok(Self::ListPosts),
            0x06 => Ok(Self::Ping),
            _ => Err(PostKvError::Protocol(format!(
                "Unknown command type: 0x{:02x}",
                byte
            ))),
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Create a post
    CreatePost { title: String, content: String },

    /// Get a post by id
    GetPost { id: String },

    /// Replace a post's title and content
    UpdatePost {
        id: String,
        title: String,
        content: String,
    },

    /// Delete a post by id
    DeletePost { id: String },

    /// List posts, newest first
    ListPosts {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cursor: Option<String>,

        /// `0` means "server default"
        #[serde(default)]
        limit: i64,
    },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::CreatePost { .. } => CommandType::CreatePost,
            Command::GetPost { .. } => CommandType::GetPost,
            Command::UpdatePost { .. } => CommandType::UpdatePost,
            Command::DeletePost { .. } => CommandType::DeletePost,
            Command::ListPosts { .. } => CommandType::ListPosts,
            Command::Ping => CommandType::Ping,
        }
    }
}
