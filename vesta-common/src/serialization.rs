// Standard data transfer and serialization patterns for Vesta
// This module provides standardized encoding/decoding for state snapshots

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Errors produced by the standardized serialization layer
#[derive(Error, Debug)]
pub enum SerializationError {
    /// Bincode encode/decode failure
    #[error("bincode error: {0}")]
    Bincode(String),

    /// JSON encode/decode failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Encoding type not supported for this operation
    #[error("encoding type not supported: {0}")]
    UnsupportedEncoding(String),
}

/// Standard encoding types used throughout Vesta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingType {
    /// Compact binary encoding for state checkpoints
    Bincode,
    /// Human-readable format for configuration and diagnostics
    Json,
}

/// Trait for standardized serialization across Vesta state types
pub trait VestaSerialize: Serialize + DeserializeOwned {
    /// Get the preferred encoding type for this data structure
    fn preferred_encoding() -> EncodingType;

    /// Serialize using the preferred encoding
    fn encode(&self) -> Result<Vec<u8>, SerializationError> {
        self.encode_as(Self::preferred_encoding())
    }

    /// Serialize using a specific encoding
    fn encode_as(&self, encoding: EncodingType) -> Result<Vec<u8>, SerializationError> {
        match encoding {
            EncodingType::Bincode => {
                bincode::serialize(self).map_err(|e| SerializationError::Bincode(e.to_string()))
            }
            EncodingType::Json => serde_json::to_vec(self).map_err(SerializationError::Json),
        }
    }

    /// Deserialize from bytes using the preferred encoding
    fn decode(bytes: &[u8]) -> Result<Self, SerializationError> {
        Self::decode_as(bytes, Self::preferred_encoding())
    }

    /// Deserialize using a specific encoding
    fn decode_as(bytes: &[u8], encoding: EncodingType) -> Result<Self, SerializationError> {
        match encoding {
            EncodingType::Bincode => {
                bincode::deserialize(bytes).map_err(|e| SerializationError::Bincode(e.to_string()))
            }
            EncodingType::Json => serde_json::from_slice(bytes).map_err(SerializationError::Json),
        }
    }
}
