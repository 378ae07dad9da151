//! Notebook: the note-saving and note-reading flow.
//!
//! Bodies are encrypted with the session cipher, both halves of the result
//! are encoded as text, and only then handed to the record store. Reading
//! runs the same steps backwards. A note whose body cannot be opened is
//! reported as unreadable on its own; it never fails a whole listing.

use std::sync::Arc;

use crate::codec;
use crate::crypto::{KeyStore, NoteCipher, SymmetricKey};
use crate::error::{CipherpadError, Result};
use crate::session::Session;
use crate::storage::{NewNote, Note, NoteRecordStore, Reseal};

/// Encoded ciphertext and IV, ready to be stored as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub encrypted_message: String,
    pub iv: String,
}

/// Encrypt `body` and encode both halves for persistence.
pub fn seal_body(cipher: &NoteCipher, body: &str) -> Result<EncodedBody> {
    let sealed = cipher.encrypt(body)?;
    Ok(EncodedBody {
        encrypted_message: codec::encode(&sealed.ciphertext),
        iv: codec::encode(&sealed.iv),
    })
}

/// Decode a stored ciphertext/IV pair and decrypt it.
///
/// # Errors
///
/// - `MalformedEncoding` if either field is not valid encoded text
/// - `InvalidCiphertext` / `AuthenticationFailed` from [`NoteCipher::decrypt`]
pub fn open_body(cipher: &NoteCipher, encrypted_message: &str, iv: &str) -> Result<String> {
    let ciphertext = codec::decode(encrypted_message)?;
    let iv = codec::decode(iv)?;
    cipher.decrypt(&ciphertext, &iv)
}

/// Why a stored body could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnreadableReason {
    /// Stored text is not a valid encoding
    MalformedEncoding,
    /// Ciphertext or IV has an impossible shape
    InvalidCiphertext,
    /// Integrity check failed: tampering, corruption, or a different key
    AuthenticationFailed,
}

impl UnreadableReason {
    fn from_error(err: &CipherpadError) -> Option<Self> {
        match err {
            CipherpadError::MalformedEncoding(_) => Some(Self::MalformedEncoding),
            CipherpadError::InvalidCiphertext(_) => Some(Self::InvalidCiphertext),
            CipherpadError::AuthenticationFailed => Some(Self::AuthenticationFailed),
            _ => None,
        }
    }
}

impl std::fmt::Display for UnreadableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::MalformedEncoding => "malformed encoding",
            Self::InvalidCiphertext => "invalid ciphertext",
            Self::AuthenticationFailed => "authentication failed",
        };
        f.write_str(text)
    }
}

/// Body of an opened note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteBody {
    Readable(String),
    Unreadable(UnreadableReason),
}

impl NoteBody {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            NoteBody::Readable(text) => Some(text),
            NoteBody::Unreadable(_) => None,
        }
    }
}

/// A stored record together with its opened body.
#[derive(Debug, Clone)]
pub struct OpenedNote {
    pub note: Note,
    pub body: NoteBody,
}

/// Outcome of [`Notebook::rotate_key`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationReport {
    /// Notes re-encrypted under the new key
    pub reencrypted: usize,
    /// Ids of notes left untouched because they were unreadable
    pub skipped: Vec<i64>,
}

/// Encrypted notes for one unlocked session.
pub struct Notebook<S: NoteRecordStore> {
    store: S,
    session: Session,
}

impl<S: NoteRecordStore> Notebook<S> {
    /// Pair a store with an unlocked session.
    ///
    /// The store is bound to the session key, so writes fail with
    /// `KeyMismatch` once the notes have moved to another key.
    pub fn new(store: S, session: Session) -> Self {
        store.bind_key(&session.key_fingerprint());
        Self { store, session }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Encrypt and save a new note.
    pub fn add(&self, title: &str, body: &str) -> Result<Note> {
        let encoded = seal_body(&self.session.cipher(), body)?;
        self.store
            .insert(&NewNote::new(title, encoded.encrypted_message, encoded.iv))
    }

    /// Change the title and/or body of a note.
    ///
    /// A new body is sealed under a fresh IV and replaces the stored pair.
    /// A title-only edit keeps the stored pair as is.
    ///
    /// # Errors
    ///
    /// Returns `NoteNotFound` if `id` does not exist.
    pub fn edit(&self, id: i64, title: Option<&str>, body: Option<&str>) -> Result<Note> {
        let mut note = self
            .store
            .get(id)?
            .ok_or(CipherpadError::NoteNotFound(id))?;

        if let Some(title) = title {
            note.title = title.to_string();
        }
        if let Some(body) = body {
            let encoded = seal_body(&self.session.cipher(), body)?;
            note.encrypted_message = encoded.encrypted_message;
            note.iv = encoded.iv;
        }
        self.store.update(&note)
    }

    /// Open one note.
    ///
    /// Unreadable bodies are returned as [`NoteBody::Unreadable`], not as errors.
    ///
    /// # Errors
    ///
    /// Returns `NoteNotFound` if `id` does not exist, or any store error.
    pub fn read(&self, id: i64) -> Result<OpenedNote> {
        let note = self
            .store
            .get(id)?
            .ok_or(CipherpadError::NoteNotFound(id))?;
        self.open(note, &self.session.cipher())
    }

    /// Open every note, most recently updated first.
    pub fn list(&self) -> Result<Vec<OpenedNote>> {
        let cipher = self.session.cipher();
        self.store
            .list()?
            .into_iter()
            .map(|note| self.open(note, &cipher))
            .collect()
    }

    /// Delete a note.
    ///
    /// # Errors
    ///
    /// Returns `NoteNotFound` if `id` does not exist.
    pub fn delete(&self, id: i64) -> Result<()> {
        if self.store.delete(id)? {
            Ok(())
        } else {
            Err(CipherpadError::NoteNotFound(id))
        }
    }

    /// Move every readable note to a freshly generated key.
    ///
    /// Reading, re-encrypting and rewriting happen in one store transaction,
    /// and the new key is stored just before it commits. If the key cannot
    /// be stored nothing is rewritten and the session keeps its old key.
    pub fn rotate_key(&mut self, key_store: &dyn KeyStore) -> Result<RotationReport> {
        let old_cipher = self.session.cipher();
        let new_key = SymmetricKey::generate()?;
        let new_cipher = NoteCipher::new(Arc::new(new_key.clone()));
        let new_fingerprint = new_key.fingerprint();

        let mut report = RotationReport::default();
        let mut key_stored = false;
        let result = self.store.reseal_all(
            &new_fingerprint,
            &mut |note| match open_body(&old_cipher, &note.encrypted_message, &note.iv) {
                Ok(body) => {
                    let encoded = seal_body(&new_cipher, &body)?;
                    report.reencrypted += 1;
                    Ok(Reseal::Replace {
                        encrypted_message: encoded.encrypted_message,
                        iv: encoded.iv,
                    })
                }
                Err(err) if err.is_unreadable_note() => {
                    tracing::warn!(note_id = note.id, error = %err, "skipping unreadable note during key rotation");
                    report.skipped.push(note.id);
                    Ok(Reseal::Keep)
                }
                Err(err) => Err(err),
            },
            &mut || {
                key_store.store(&new_key)?;
                key_stored = true;
                Ok(())
            },
        );

        if let Err(err) = result {
            if key_stored {
                // The commit itself failed; the notes are still under the old key.
                if let Err(restore_err) = key_store.store(self.session.key()) {
                    tracing::error!(error = %restore_err, "failed to restore previous note key");
                }
            }
            return Err(err);
        }
        self.session.replace_key(new_key);

        tracing::debug!(
            reencrypted = report.reencrypted,
            skipped = report.skipped.len(),
            "note key rotated"
        );
        Ok(report)
    }

    /// Lock the session and hand back the store.
    pub fn lock(self) -> S {
        self.session.lock();
        self.store
    }

    fn open(&self, note: Note, cipher: &NoteCipher) -> Result<OpenedNote> {
        let body = match open_body(cipher, &note.encrypted_message, &note.iv) {
            Ok(text) => NoteBody::Readable(text),
            Err(err) => match UnreadableReason::from_error(&err) {
                Some(reason) => {
                    tracing::warn!(note_id = note.id, %reason, "note body unreadable");
                    NoteBody::Unreadable(reason)
                }
                None => return Err(err),
            },
        };
        Ok(OpenedNote { note, body })
    }
}
