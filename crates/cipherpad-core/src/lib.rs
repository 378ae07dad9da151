//! # Cipherpad Core
//!
//! Core library for Cipherpad - a local, password-gated notepad that encrypts
//! every note body on its own.
//!
//! This crate provides password authentication, per-note encryption, and
//! the storage abstractions, independent of any user interface.
//!
//! ## Architecture
//!
//! - **codec**: text encoding for ciphertext, IVs, salts and digests
//! - **crypto**: salts, password digests, the note key, and the note cipher
//! - **gate**: set / verify the app password
//! - **session**: the key handle that exists only while unlocked
//! - **settings**: key-value store for the password credential
//! - **storage**: note record store trait and SQLite backend
//! - **notebook**: add / edit / read / list / delete / rotate-key flow

pub mod codec;
pub mod crypto;
pub mod error;
pub mod fs;
pub mod gate;
pub mod notebook;
pub mod session;
pub mod settings;
pub mod storage;

pub use error::{CipherpadError, Result};
pub use gate::PasswordGate;
pub use notebook::{NoteBody, Notebook, OpenedNote, RotationReport, UnreadableReason};
pub use session::Session;
pub use settings::{FileSettingsStore, MemorySettingsStore, SettingsStore};
pub use storage::{NoteRecordStore, SqliteNoteStore};

/// Re-exported so callers can build passwords without depending on `secrecy`.
pub use secrecy::{ExposeSecret, SecretString};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
