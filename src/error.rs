//! Error types for postkv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using PostKvError
pub type Result<T> = std::result::Result<T, PostKvError>;

/// Unified error type for postkv operations
#[derive(Debug, Error)]
pub enum PostKvError {
    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    // -------------------------------------------------------------------------
    // Pagination Errors
    // -------------------------------------------------------------------------
    #[error("Invalid pagination cursor: {0}")]
    Pagination(String),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Post not found: {0}")]
    PostNotFound(String),

    // -------------------------------------------------------------------------
    // I/O and Network Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PostKvError {
    /// Shorthand for a validation failure on `field`
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True for both store-level and domain-level absence
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::PostNotFound(_))
    }

    /// HTTP-equivalent status used by the front end
    ///
    /// Absence maps to 404, caller mistakes to 400, everything else to 500.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::PostNotFound(_) => 404,
            Self::Pagination(_) | Self::Validation { .. } | Self::InvalidKey(_) => 400,
            _ => 500,
        }
    }

    /// Stable machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PostNotFound(_) => "POST_NOT_FOUND",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Pagination(_) => "PAGINATION_ERROR",
            Self::InvalidKey(_) => "INVALID_KEY",
            Self::Storage(_) => "STORAGE_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }
}
