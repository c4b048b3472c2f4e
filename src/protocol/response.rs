//! Response definitions
//!
//! Represents responses to clients.

use serde::{Deserialize, Serialize};

use crate::error::{PostKvError, Result};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    BadRequest = 0x02,
    Error = 0x03,
}

impl Status {
    /// Status for an error, following its HTTP-equivalent code
    pub fn for_error(err: &PostKvError) -> Self {
        match err.status_code() {
            404 => Status::NotFound,
            400 => Status::BadRequest,
            _ => Status::Error,
        }
    }
}

/// JSON body carried by every non-OK response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional JSON payload
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create an OK response carrying `value` as JSON
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let payload =
            serde_json::to_vec(value).map_err(|e| PostKvError::Encode(e.to_string()))?;
        Ok(Self::ok(Some(payload)))
    }

    /// Create an error response from a typed error
    pub fn from_error(err: &PostKvError) -> Self {
        Self::with_body(
            Status::for_error(err),
            err.error_code(),
            &err.to_string(),
        )
    }

    /// Create an ERROR response from a bare message
    pub fn error(message: &str) -> Self {
        Self::with_body(Status::Error, "INTERNAL_ERROR", message)
    }

    /// Decode the error body of a non-OK response
    pub fn error_body(&self) -> Option<ErrorBody> {
        if self.status == Status::Ok {
            return None;
        }
        self.payload
            .as_deref()
            .and_then(|p| serde_json::from_slice(p).ok())
    }

    fn with_body(status: Status, code: &str, message: &str) -> Self {
        let body = ErrorBody {
            code: code.to_string(),
            message: message.to_string(),
        };
        // Two plain strings always serialize.
        let payload = serde_json::to_vec(&body).unwrap_or_else(|_| message.as_bytes().to_vec());
        Self {
            status,
            payload: Some(payload),
        }
    }
}
