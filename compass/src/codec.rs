use base64::{engine::general_purpose::STANDARD, Engine};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;
use shared::{Error, Result};
use std::io::{Read, Write};

/// Encodes cached JSON for the distributed tier.
///
/// Compressed payloads are gzip streams wrapped in standard base64 so that they
/// stay valid strings for the store. Uncompressed payloads are plain JSON text.
#[derive(Clone, Copy, Debug)]
pub struct Codec {
    level: u32,
}

impl Default for Codec {
    fn default() -> Self {
        Self { level: 6 }
    }
}

impl Codec {
    pub const MAX_LEVEL: u32 = 9;

    pub fn new(level: u32) -> Result<Self> {
        if level > Self::MAX_LEVEL {
            return Err(Error::Config(format!(
                "compression level {} is out of range (0-{})",
                level,
                Self::MAX_LEVEL
            )));
        }
        Ok(Self { level })
    }

    pub fn encode(&self, value: &Value, compress: bool) -> Result<String> {
        let json = serde_json::to_vec(value)
            .map_err(|e| Error::Codec(format!("failed to serialize value: {}", e)))?;

        if !compress {
            return String::from_utf8(json).map_err(|e| Error::Codec(e.to_string()));
        }

        let mut encoder = GzEncoder::new(Vec::new(), Compression::new(self.level));
        encoder
            .write_all(&json)
            .map_err(|e| Error::Codec(format!("gzip write failed: {}", e)))?;
        let compressed = encoder
            .finish()
            .map_err(|e| Error::Codec(format!("gzip finish failed: {}", e)))?;

        Ok(STANDARD.encode(compressed))
    }

    pub fn decode(&self, payload: &str, compress: bool) -> Result<Value> {
        if !compress {
            return serde_json::from_str(payload)
                .map_err(|e| Error::Codec(format!("invalid JSON payload: {}", e)));
        }

        let compressed = STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::Codec(format!("invalid base64 payload: {}", e)))?;

        let mut json = Vec::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_end(&mut json)
            .map_err(|e| Error::Codec(format!("gzip read failed: {}", e)))?;

        serde_json::from_slice(&json)
            .map_err(|e| Error::Codec(format!("invalid JSON payload: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "hotels": [
                {"hotel_id": 1, "name": "The Savoy", "price": {"gross": 512.4, "currency": "GBP"}},
                {"hotel_id": 2, "name": "Claridge's", "price": {"gross": 610.0, "currency": "GBP"}}
            ],
            "meta": {"total": 2}
        })
    }

    #[test]
    fn test_compressed_payload_is_base64_gzip() {
        let codec = Codec::default();
        let payload = codec.encode(&sample(), true).unwrap();

        let raw = STANDARD.decode(&payload).unwrap();
        // gzip magic bytes
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);
        assert_eq!(codec.decode(&payload, true).unwrap(), sample());
    }

    #[test]
    fn test_uncompressed_payload_is_plain_json() {
        let codec = Codec::default();
        let payload = codec.encode(&sample(), false).unwrap();
        assert!(payload.starts_with('{'));
        assert_eq!(codec.decode(&payload, false).unwrap(), sample());
    }

    #[test]
    fn test_repetitive_payload_shrinks() {
        let codec = Codec::default();
        let value = json!({ "blob": "hotel ".repeat(2000) });
        let plain = codec.encode(&value, false).unwrap();
        let packed = codec.encode(&value, true).unwrap();
        assert!(packed.len() < plain.len() / 4);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let codec = Codec::default();
        assert!(matches!(codec.decode("%%% not base64", true), Err(Error::Codec(_))));
        // valid base64, not gzip
        let not_gzip = STANDARD.encode(b"plain bytes");
        assert!(matches!(codec.decode(&not_gzip, true), Err(Error::Codec(_))));
        // compressed payload read as plain JSON
        let packed = codec.encode(&sample(), true).unwrap();
        assert!(matches!(codec.decode(&packed, false), Err(Error::Codec(_))));
    }

    #[test]
    fn test_level_is_validated() {
        assert!(Codec::new(9).is_ok());
        assert!(matches!(Codec::new(10), Err(Error::Config(_))));
    }
}
