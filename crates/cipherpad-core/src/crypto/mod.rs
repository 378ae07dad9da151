//! Cryptographic operations for Cipherpad.
//!
//! This module provides password hashing and note encryption using
//! well-audited libraries:
//! - **SHA-512** (`sha2`): salted password digest
//! - **AES-256-GCM** (`aes-gcm`): authenticated note encryption
//! - **getrandom**: OS secure random source for salts, IVs and keys
//!
//! ## Security Model
//!
//! - Only `salt` and `SHA-512(salt || password)` are persisted, never the password
//! - Every note encryption uses a fresh 96-bit IV
//! - Tampering with ciphertext or IV is detected by the GCM tag
//! - Key material is zeroized from memory on drop
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the note database or settings file
//! - Silent corruption or modification of stored ciphertext
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to an unlocked session / memory

pub mod cipher;
pub mod key;
pub mod password;

pub use cipher::{NoteCipher, SealedNote, IV_LENGTH, MAX_NOTE_BYTES, TAG_LENGTH};
pub use key::{
    load_or_create_key, FileKeyStore, KeyStore, MemoryKeyStore, SymmetricKey, KEY_LENGTH,
};
pub use password::{
    constant_time_eq, generate_salt, hash_password, validate_password, PasswordDigest, Salt,
    DIGEST_LENGTH, SALT_LENGTH,
};

use crate::error::{CipherpadError, Result};

/// Fill `buf` from the OS secure random source.
///
/// There is no fallback: if the OS source is unavailable the caller gets
/// `CryptoUnavailable`.
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<()> {
    getrandom::getrandom(buf)
        .map_err(|e| CipherpadError::CryptoUnavailable(format!("Secure random source: {}", e)))
}
