//! Note body encryption with AES-256-GCM.
//!
//! Each call to [`NoteCipher::encrypt`] draws a fresh 96-bit IV from the OS
//! random source. The ciphertext carries the 16-byte GCM tag at its end, so a
//! change to any bit of the ciphertext or the IV fails authentication.

use std::sync::Arc;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use zeroize::Zeroize;

use super::fill_random;
use super::key::SymmetricKey;
use crate::error::{CipherpadError, Result};

/// IV length in bytes (96 bits, the GCM standard nonce size).
pub const IV_LENGTH: usize = 12;

/// GCM authentication tag length in bytes.
pub const TAG_LENGTH: usize = 16;

/// Largest note body accepted for encryption (1 MiB of UTF-8).
pub const MAX_NOTE_BYTES: usize = 1024 * 1024;

/// Ciphertext and the IV it was produced with.
///
/// The two always travel together; a ciphertext is never opened with any
/// other IV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedNote {
    /// Encrypted body followed by the GCM tag
    pub ciphertext: Vec<u8>,

    /// IV used for this ciphertext only
    pub iv: [u8; IV_LENGTH],
}

/// Encrypts and decrypts note bodies under a session key.
///
/// Cloning is cheap; clones share the same immutable key and can be used
/// from many threads at once.
#[derive(Clone)]
pub struct NoteCipher {
    key: Arc<SymmetricKey>,
}

impl NoteCipher {
    pub fn new(key: Arc<SymmetricKey>) -> Self {
        Self { key }
    }

    fn aead(&self) -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(self.key.as_bytes())
            .map_err(|e| CipherpadError::CryptoUnavailable(format!("AES-256-GCM init: {}", e)))
    }

    /// Encrypt a note body under a fresh random IV.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the body is larger than [`MAX_NOTE_BYTES`]
    /// - `CryptoUnavailable` if the random source or cipher fails
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use cipherpad_core::crypto::{NoteCipher, SymmetricKey};
    ///
    /// let cipher = NoteCipher::new(Arc::new(SymmetricKey::generate().unwrap()));
    /// let sealed = cipher.encrypt("Buy milk").unwrap();
    /// assert_eq!(cipher.decrypt(&sealed.ciphertext, &sealed.iv).unwrap(), "Buy milk");
    /// ```
    pub fn encrypt(&self, plaintext: &str) -> Result<SealedNote> {
        if plaintext.len() > MAX_NOTE_BYTES {
            return Err(CipherpadError::InvalidInput(format!(
                "Note body exceeds {} bytes (got {})",
                MAX_NOTE_BYTES,
                plaintext.len()
            )));
        }

        let mut iv = [0u8; IV_LENGTH];
        fill_random(&mut iv)?;

        let ciphertext = self
            .aead()?
            .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
            .map_err(|_| CipherpadError::CryptoUnavailable("AES-256-GCM encrypt".to_string()))?;

        Ok(SealedNote { ciphertext, iv })
    }

    /// Decrypt a ciphertext with the IV produced alongside it.
    ///
    /// Shapes are validated before any cryptographic work.
    ///
    /// # Errors
    ///
    /// - `InvalidCiphertext` if the IV is not [`IV_LENGTH`] bytes, the
    ///   ciphertext is shorter than the tag, or the plaintext is not UTF-8
    /// - `AuthenticationFailed` if the tag does not verify (tampering,
    ///   corruption, or the wrong key)
    pub fn decrypt(&self, ciphertext: &[u8], iv: &[u8]) -> Result<String> {
        if iv.len() != IV_LENGTH {
            return Err(CipherpadError::InvalidCiphertext(format!(
                "IV must be {} bytes (got {})",
                IV_LENGTH,
                iv.len()
            )));
        }
        if ciphertext.len() < TAG_LENGTH {
            return Err(CipherpadError::InvalidCiphertext(format!(
                "Ciphertext must be at least {} bytes (got {})",
                TAG_LENGTH,
                ciphertext.len()
            )));
        }

        let plaintext = self
            .aead()?
            .decrypt(Nonce::from_slice(iv), ciphertext)
            .map_err(|_| {
                tracing::warn!(
                    ciphertext_len = ciphertext.len(),
                    "note failed authentication"
                );
                CipherpadError::AuthenticationFailed
            })?;

        String::from_utf8(plaintext).map_err(|e| {
            let mut bytes = e.into_bytes();
            bytes.zeroize();
            CipherpadError::InvalidCiphertext("Decrypted body is not UTF-8".to_string())
        })
    }
}

impl std::fmt::Debug for NoteCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteCipher").finish_non_exhaustive()
    }
}
