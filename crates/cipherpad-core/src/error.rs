//! Error types for Cipherpad core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer will map these
//! to user-friendly messages.
//!
//! No variant ever carries a password or note plaintext.

use thiserror::Error;

/// Result type alias for Cipherpad operations.
pub type Result<T> = std::result::Result<T, CipherpadError>;

/// Core error type for Cipherpad operations.
#[derive(Debug, Error)]
pub enum CipherpadError {
    /// Secure random source or cipher primitive is unusable (fatal)
    #[error("Cryptographic primitive unavailable: {0}")]
    CryptoUnavailable(String),

    /// Persisted text is not a valid encoding
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    /// Ciphertext or IV has an impossible shape
    #[error("Invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    /// Integrity check failed on decrypt (tampering, corruption or wrong key)
    #[error("Authentication failed: ciphertext or IV was modified, or the key is wrong")]
    AuthenticationFailed,

    /// Settings, key or record store could not be written
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// Verification attempted before any password was configured
    #[error("No password has been set")]
    NoCredentialSet,

    /// Stored credential is half-written or has the wrong shape
    #[error("Stored credential is incomplete: {0}")]
    IncompleteCredential(String),

    /// The key store holds no note key for this installation
    #[error("Note key not found in the key store")]
    NoteKeyMissing,

    /// The note database was written under a different note key
    #[error("Note database belongs to a different note key")]
    KeyMismatch,

    /// Password did not match when unlocking
    #[error("Incorrect password")]
    IncorrectPassword,

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Note not found by ID
    #[error("Note not found: {0}")]
    NoteNotFound(i64),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl From<std::io::Error> for CipherpadError {
    fn from(err: std::io::Error) -> Self {
        CipherpadError::PersistenceFailure(err.to_string())
    }
}

impl CipherpadError {
    /// Whether this error means a single note's body cannot be read.
    ///
    /// These are recoverable per record: the rest of the store stays usable.
    pub fn is_unreadable_note(&self) -> bool {
        matches!(
            self,
            CipherpadError::MalformedEncoding(_)
                | CipherpadError::InvalidCiphertext(_)
                | CipherpadError::AuthenticationFailed
        )
    }
}
