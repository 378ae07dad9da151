//! Note record storage for Cipherpad.
//!
//! This module defines the `NoteRecordStore` trait and the record types that
//! cross it.
//!
//! ## Architecture
//!
//! The storage layer is designed to be backend-agnostic:
//! - SQLite file (or in-memory) via `SqliteNoteStore`
//! - Anything else that can keep four text fields per record
//!
//! ## Security
//!
//! Stores never see a note body in plaintext. Encryption happens in the
//! notebook before a record is handed over, and each record's ciphertext and
//! IV are always written and replaced as a pair.

pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export public types
pub use sqlite::SqliteNoteStore;
pub use traits::{NoteRecordStore, Reseal};
pub use types::{NewNote, Note, UNSAVED_NOTE_ID};
