// Content codec: binary-safe text encoding for file bytes travelling
// inside JSON payloads. The contents endpoint expects standard base64
// with no line wrapping.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("malformed base64 content: {0}")]
    Malformed(#[from] base64::DecodeError),
}

/// Encode raw bytes as standard, unwrapped base64.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode base64 text back into bytes. Fails on characters outside the
/// standard alphabet and on bad padding.
pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    Ok(STANDARD.decode(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_byte_value() {
        let all: Vec<u8> = (0u8..=255).collect();
        assert_eq!(decode(&encode(&all)).unwrap(), all);
    }

    #[test]
    fn round_trips_empty_input() {
        assert_eq!(encode(&[]), "");
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn encodes_known_vector() {
        assert_eq!(encode(b"hi"), "aGk=");
    }

    #[test]
    fn never_wraps_lines() {
        let encoded = encode(&[b'x'; 300]);
        assert!(!encoded.contains('\n'));
        assert!(!encoded.contains('\r'));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(decode("not base64!!").is_err());
        assert!(decode("aGk").is_err()); // bad padding
    }
}
