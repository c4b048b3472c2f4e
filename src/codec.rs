//! Payload codecs
//!
//! The store only ever sees bytes. A `Codec` turns domain values into those
//! bytes and back, so the storage engine never depends on what it holds.
//!
//! Round trips guarantee structural equality, not byte identity.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{PostKvError, Result};

/// Serializes values to and from store payloads
pub trait Codec: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Encode a value into an immutable payload
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Bytes>;

    /// Decode a payload into the requested shape
    ///
    /// Fails with `Decode` if the payload does not fit `T`.
    fn decode<T: DeserializeOwned>(&self, payload: &[u8]) -> Result<T>;
}

/// JSON codec (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Bytes> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| PostKvError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, payload: &[u8]) -> Result<T> {
        serde_json::from_slice(payload).map_err(|e| PostKvError::Decode(e.to_string()))
    }
}

/// Compact binary codec
///
/// Not self-describing: decoding into a different shape than was encoded may
/// succeed with garbage or fail, depending on field layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn name(&self) -> &'static str {
        "bincode"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Bytes> {
        bincode::serialize(value)
            .map(Bytes::from)
            .map_err(|e| PostKvError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, payload: &[u8]) -> Result<T> {
        bincode::deserialize(payload).map_err(|e| PostKvError::Decode(e.to_string()))
    }
}

/// Codec selection for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CodecKind {
    #[default]
    Json,
    Bincode,
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Bincode => f.write_str("bincode"),
        }
    }
}

impl FromStr for CodecKind {
    type Err = PostKvError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "bincode" => Ok(Self::Bincode),
            other => Err(PostKvError::Config(format!("unknown codec: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        title: String,
        tags: Vec<String>,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Counter {
        count: u64,
    }

    fn note() -> Note {
        Note {
            title: "hello".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
        }
    }

    #[test]
    fn test_json_structural_round_trip() {
        let payload = JsonCodec.encode(&note()).unwrap();
        let decoded: Note = JsonCodec.decode(&payload).unwrap();
        assert_eq!(decoded, note());
    }

    #[test]
    fn test_bincode_structural_round_trip() {
        let payload = BincodeCodec.encode(&note()).unwrap();
        let decoded: Note = BincodeCodec.decode(&payload).unwrap();
        assert_eq!(decoded, note());
    }

    #[test]
    fn test_json_shape_mismatch_is_decode_error() {
        let payload = JsonCodec.encode(&note()).unwrap();
        let result: Result<Counter> = JsonCodec.decode(&payload);
        assert!(matches!(result, Err(PostKvError::Decode(_))));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let result: Result<Note> = JsonCodec.decode(b"{not json");
        assert!(matches!(result, Err(PostKvError::Decode(_))));

        let result: Result<Note> = BincodeCodec.decode(&[0xFF]);
        assert!(matches!(result, Err(PostKvError::Decode(_))));
    }

    #[test]
    fn test_codec_kind_parse() {
        assert_eq!("json".parse::<CodecKind>().unwrap(), CodecKind::Json);
        assert_eq!("BINCODE".parse::<CodecKind>().unwrap(), CodecKind::Bincode);
        assert!("xml".parse::<CodecKind>().is_err());
    }

    #[test]
    fn test_codec_kind_display_parses_back() {
        for kind in [CodecKind::Json, CodecKind::Bincode] {
            assert_eq!(kind.to_string().parse::<CodecKind>().unwrap(), kind);
        }
    }
}
