//! Salted password digests.
//!
//! The stored credential is `SHA-512(salt || password)` plus the 16-byte salt.
//! Verification recomputes the digest and compares it in constant time.

use sha2::{Digest, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::fill_random;
use crate::error::{CipherpadError, Result};

/// Salt length in bytes (128 bits).
pub const SALT_LENGTH: usize = 16;

/// SHA-512 output length in bytes.
pub const DIGEST_LENGTH: usize = 64;

/// Random salt combined with a password before hashing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LENGTH]);

impl Salt {
    pub fn from_bytes(bytes: [u8; SALT_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LENGTH] {
        &self.0
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Salt").field(&crate::codec::encode(&self.0)).finish()
    }
}

/// Digest of `salt || password`.
///
/// Equality is not derived; use [`PasswordDigest::matches`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PasswordDigest([u8; DIGEST_LENGTH]);

impl PasswordDigest {
    pub fn from_bytes(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LENGTH] {
        &self.0
    }

    /// Constant-time comparison against another digest.
    pub fn matches(&self, other: &PasswordDigest) -> bool {
        constant_time_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PasswordDigest").field(&"[REDACTED]").finish()
    }
}

/// Generate a fresh salt from the OS secure random source.
///
/// # Errors
///
/// Returns `CipherpadError::CryptoUnavailable` if the random source fails.
pub fn generate_salt() -> Result<Salt> {
    let mut bytes = [0u8; SALT_LENGTH];
    fill_random(&mut bytes)?;
    Ok(Salt(bytes))
}

/// Compute `SHA-512(salt || password)`.
///
/// Deterministic for a fixed password and salt.
///
/// # Examples
///
/// ```
/// use cipherpad_core::crypto::{hash_password, Salt};
///
/// let salt = Salt::from_bytes([7u8; 16]);
/// let a = hash_password("secret123", &salt);
/// let b = hash_password("secret123", &salt);
/// assert!(a.matches(&b));
/// ```
pub fn hash_password(password: &str, salt: &Salt) -> PasswordDigest {
    let mut hasher = Sha512::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let mut out = [0u8; DIGEST_LENGTH];
    out.copy_from_slice(&hasher.finalize());
    PasswordDigest(out)
}

/// Validate that a new password is usable.
///
/// Empty and whitespace-only passwords are rejected; there is no other policy.
pub fn validate_password(password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(CipherpadError::InvalidInput(
            "Password cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Compare two byte slices in time independent of where they first differ.
///
/// Slices of different length compare unequal immediately; lengths are not secret.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    std::hint::black_box(diff) == 0
}
