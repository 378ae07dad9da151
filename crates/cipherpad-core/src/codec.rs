//! Text encoding for binary values persisted in text columns.
//!
//! Ciphertext, IVs, salts and digests are stored as standard padded base64.
//! Decoding is strict: no whitespace, no URL-safe alphabet, canonical padding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{CipherpadError, Result};

/// Encode bytes as text.
///
/// # Examples
///
/// ```
/// use cipherpad_core::codec::{decode, encode};
///
/// let text = encode(&[0xde, 0xad, 0xbe, 0xef]);
/// assert_eq!(text, "3q2+7w==");
/// assert_eq!(decode(&text).unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
/// ```
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode text produced by [`encode`].
///
/// # Errors
///
/// Returns `CipherpadError::MalformedEncoding` on characters outside the
/// alphabet, bad padding, or an impossible length.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text)
        .map_err(|e| CipherpadError::MalformedEncoding(e.to_string()))
}

/// Decode text that must hold exactly `N` bytes.
pub(crate) fn decode_array<const N: usize>(text: &str, what: &str) -> Result<[u8; N]> {
    let bytes = decode(text)?;
    bytes.as_slice().try_into().map_err(|_| {
        CipherpadError::MalformedEncoding(format!(
            "{} must be {} bytes (got {})",
            what,
            N,
            bytes.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_round_trip() {
        assert_eq!(encode(&[]), "");
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_all_byte_values() {
        let bytes: Vec<u8> = (0..=255).collect();
        assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn test_invalid_character_rejected() {
        let result = decode("abc$");
        assert!(matches!(result, Err(CipherpadError::MalformedEncoding(_))));
    }

    #[test]
    fn test_invalid_length_rejected() {
        assert!(matches!(
            decode("abcde"),
            Err(CipherpadError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_missing_padding_rejected() {
        assert!(matches!(
            decode("3q2+7w"),
            Err(CipherpadError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_embedded_newline_rejected() {
        assert!(matches!(
            decode("3q2+\n7w=="),
            Err(CipherpadError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_decode_array_checks_length() {
        let ok: [u8; 4] = decode_array(&encode(&[1, 2, 3, 4]), "value").unwrap();
        assert_eq!(ok, [1, 2, 3, 4]);

        let err = decode_array::<16>(&encode(&[1, 2, 3]), "salt").unwrap_err();
        assert!(err.to_string().contains("salt must be 16 bytes"));
    }
}
