//! Core data types for the note record store.
//!
//! Records hold the body only in encoded, encrypted form. Title and
//! timestamps are plaintext metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Id value of a note that has not been persisted yet.
pub const UNSAVED_NOTE_ID: i64 = 0;

/// A persisted note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Store-assigned identifier (0 means not yet persisted)
    pub id: i64,

    /// Plaintext title, may be empty
    pub title: String,

    /// Encoded ciphertext of the body
    pub encrypted_message: String,

    /// Encoded IV paired with `encrypted_message`
    pub iv: String,

    /// When this note was first saved
    pub created_at: DateTime<Utc>,

    /// When the body or title last changed
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn is_persisted(&self) -> bool {
        self.id != UNSAVED_NOTE_ID
    }
}

/// Builder for inserting a new note record.
#[derive(Debug, Clone)]
pub struct NewNote {
    /// Plaintext title
    pub title: String,

    /// Encoded ciphertext of the body
    pub encrypted_message: String,

    /// Encoded IV paired with `encrypted_message`
    pub iv: String,
}

impl NewNote {
    pub fn new(
        title: impl Into<String>,
        encrypted_message: impl Into<String>,
        iv: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            encrypted_message: encrypted_message.into(),
            iv: iv.into(),
        }
    }
}
