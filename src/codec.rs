//! Text encoding for binary payloads stored in the vault.
//!
//! File contents are stored as standard base64 so the plaintext form of
//! the vault stays text-safe. The same encoding can be reversed with a
//! `b64decode`-style filter wherever the vault is consumed.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::errors::{BlobVaultError, Result};

/// Encode arbitrary bytes as base64 text.
pub fn encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decode base64 text back into bytes.
///
/// ASCII whitespace is ignored so wrapped values still decode.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    BASE64
        .decode(compact.as_bytes())
        .map_err(|e| BlobVaultError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encodes_known_bytes() {
        assert_eq!(encode(&[0x01, 0x02, 0x03]), "AQID");
    }

    #[test]
    fn empty_roundtrip() {
        assert_eq!(encode(b""), "");
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn decode_ignores_line_breaks() {
        assert_eq!(decode("AQ\nID\r\n").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn decode_rejects_malformed_input() {
        let err = decode("not base64!").unwrap_err();
        assert!(matches!(err, BlobVaultError::Decode(_)));
    }

    proptest! {
        #[test]
        fn decode_reverses_encode(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
        }
    }
}
