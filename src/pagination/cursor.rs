//! Cursor tokens
//!
//! ## Token Format
//! ```text
//! base64url_nopad( JSON {"id":..,"limit":..} ‖ CRC32_BE(JSON) )
//! ```
//!
//! The trailing checksum catches truncated or hand-edited tokens before the
//! JSON is even parsed. It is an integrity check, not authentication.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{PostKvError, Result};

/// URL-safe alphabet; emits no padding, tolerates it on input
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Checksum size in bytes
const CRC_SIZE: usize = 4;

/// Longest token accepted for decoding
const MAX_TOKEN_LEN: usize = 4096;

/// Resume position: the last item of the previous page and its page size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cursor {
    pub id: String,
    pub limit: i64,
}

impl Cursor {
    pub fn new(id: impl Into<String>, limit: i64) -> Self {
        Self {
            id: id.into(),
            limit,
        }
    }

    /// Encode into an opaque, URL-safe token
    pub fn encode(&self) -> Result<String> {
        let mut raw =
            serde_json::to_vec(self).map_err(|e| PostKvError::Encode(e.to_string()))?;
        let crc = crc32fast::hash(&raw);
        raw.extend_from_slice(&crc.to_be_bytes());
        Ok(TOKEN_ENGINE.encode(raw))
    }

    /// Decode a token produced by `encode`
    ///
    /// Every malformed, truncated or tampered token fails with `Pagination`.
    pub fn decode(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(invalid(token, "empty cursor"));
        }
        if token.len() > MAX_TOKEN_LEN {
            return Err(invalid(token, "cursor too long"));
        }

        let raw = TOKEN_ENGINE
            .decode(token)
            .map_err(|e| invalid(token, &e.to_string()))?;

        if raw.len() <= CRC_SIZE {
            return Err(invalid(token, "cursor truncated"));
        }

        let (body, crc_bytes) = raw.split_at(raw.len() - CRC_SIZE);
        let stored_crc = u32::from_be_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
        if crc32fast::hash(body) != stored_crc {
            return Err(invalid(token, "checksum mismatch"));
        }

        let cursor: Cursor =
            serde_json::from_slice(body).map_err(|e| invalid(token, &e.to_string()))?;

        if cursor.id.is_empty() {
            return Err(invalid(token, "cursor id is empty"));
        }

        Ok(cursor)
    }
}

fn invalid(token: &str, reason: &str) -> PostKvError {
    // Tokens come from callers; keep error messages bounded.
    let shown: String = token.chars().take(64).collect();
    PostKvError::Pagination(format!("{} ({})", shown, reason))
}
