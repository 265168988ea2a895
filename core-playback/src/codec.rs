//! Base64 transport codec.
//!
//! Speech payloads arrive as standard-alphabet, padded base64 text.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{PlaybackError, Result};

/// Decode a transport payload into raw bytes.
///
/// Leading and trailing ASCII whitespace is ignored; anything else outside
/// the standard alphabet, or bad padding, is a
/// [`PlaybackError::TransportDecode`]. An empty payload decodes to no bytes.
pub fn decode(input: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(input.trim_matches(|c: char| c.is_ascii_whitespace()))
        .map_err(|e| PlaybackError::TransportDecode(e.to_string()))
}

/// Encode raw bytes as a transport payload.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_standard_alphabet() {
        assert_eq!(
            decode("AAAAQADA/38=").unwrap(),
            vec![0, 0, 0, 64, 0, 192, 255, 127]
        );
    }

    #[test]
    fn empty_payload_is_empty() {
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn trims_surrounding_whitespace_only() {
        assert_eq!(decode(" AQI=\n").unwrap(), vec![1, 2]);
        assert!(matches!(
            decode("AQ I="),
            Err(PlaybackError::TransportDecode(_))
        ));
    }

    #[test]
    fn rejects_foreign_characters_and_bad_padding() {
        assert!(matches!(decode("AQI*"), Err(PlaybackError::TransportDecode(_))));
        assert!(matches!(decode("AQI"), Err(PlaybackError::TransportDecode(_))));
        // URL-safe alphabet is not accepted
        assert!(decode("-_8=").is_err());
    }

    #[test]
    fn encode_is_padded_standard() {
        assert_eq!(encode(&[0xfb, 0xff]), "+/8=");
    }
}
