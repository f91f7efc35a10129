//! In-memory image payloads.
//!
//! Images travel through the system as base64 strings (the wire format of
//! the generation API and the format the frontend holds in memory), paired
//! with their MIME type.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// PNG MIME type, the default for generated images.
pub const MIME_PNG: &str = "image/png";

/// A base64-encoded image plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Base64-encoded image bytes (standard alphabet, padded).
    pub base64: String,
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
}

impl ImageData {
    /// Wrap base64 PNG data.
    pub fn png(base64: impl Into<String>) -> Self {
        Self {
            base64: base64.into(),
            mime_type: MIME_PNG.to_string(),
        }
    }

    /// Decode the base64 payload into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, CoreError> {
        use base64::{engine::general_purpose, Engine as _};
        general_purpose::STANDARD
            .decode(&self.base64)
            .map_err(|e| CoreError::Validation(format!("Invalid base64 image data: {e}")))
    }

    /// Encode raw bytes into an [`ImageData`] with the given MIME type.
    pub fn encode(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        use base64::{engine::general_purpose, Engine as _};
        Self {
            base64: general_purpose::STANDARD.encode(bytes),
            mime_type: mime_type.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let bytes = [0x89u8, 0x50, 0x4e, 0x47];
        let image = ImageData::encode(&bytes, MIME_PNG);
        assert_eq!(image.decode().unwrap(), bytes);
    }

    #[test]
    fn decode_rejects_invalid_base64() {
        let image = ImageData::png("not*valid*base64");
        let err = image.decode().unwrap_err();
        assert!(err.to_string().contains("Invalid base64"));
    }
}
