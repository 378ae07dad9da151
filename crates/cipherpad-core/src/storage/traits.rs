//! Note record store trait definition.
//!
//! The `NoteRecordStore` trait is the interface between the notebook and
//! whatever persists note records. A store only ever sees titles, timestamps,
//! and encoded ciphertext/IV pairs; it never sees a note body in plaintext.

use super::types::{NewNote, Note};
use crate::error::Result;

/// What [`NoteRecordStore::reseal_all`] does with one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reseal {
    /// Leave the record as stored
    Keep,
    /// Replace the ciphertext/IV pair
    Replace { encrypted_message: String, iv: String },
}

/// Persistence for encrypted note records.
///
/// All implementations must ensure:
/// - `encrypted_message` and `iv` are written and replaced together
/// - Ids are assigned by the store and are never 0
/// - Once bound to a key fingerprint, writes fail with `KeyMismatch` while
///   the stored records belong to a different key
pub trait NoteRecordStore: Send + Sync {
    /// Bind this handle to the fingerprint of the key its writer holds.
    ///
    /// The first bound write to a store that has no fingerprint yet adopts it.
    fn bind_key(&self, fingerprint: &str);

    /// Insert a new record.
    ///
    /// # Returns
    ///
    /// Returns the persisted note, with its assigned id and timestamps.
    fn insert(&self, note: &NewNote) -> Result<Note>;

    /// Replace title, ciphertext and IV of an existing record.
    ///
    /// `updated_at` is refreshed; `created_at` is kept.
    ///
    /// # Errors
    ///
    /// Returns `CipherpadError::NoteNotFound` if no record has `note.id`.
    fn update(&self, note: &Note) -> Result<Note>;

    /// Get a record by id.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(note))` if found, `Ok(None)` if not found.
    fn get(&self, id: i64) -> Result<Option<Note>>;

    /// List all records, most recently updated first.
    fn list(&self) -> Result<Vec<Note>>;

    /// Delete a record.
    ///
    /// # Returns
    ///
    /// Returns `true` if a record was removed.
    fn delete(&self, id: i64) -> Result<bool>;

    /// Rewrite the ciphertext/IV pair of many records at once.
    ///
    /// Titles and timestamps are left untouched. Either every record is
    /// rewritten or none is.
    ///
    /// # Errors
    ///
    /// Returns `CipherpadError::NoteNotFound` (and writes nothing) if any id
    /// is missing.
    fn replace_ciphertexts(&self, notes: &[Note]) -> Result<()>;

    /// Re-encrypt every record in one exclusive write transaction.
    ///
    /// `reseal` sees each record as currently stored and decides whether to
    /// replace its pair. Before the transaction commits, the store switches
    /// to `new_fingerprint` and calls `before_commit`; if either `reseal` or
    /// `before_commit` fails, nothing is written. No other writer can change
    /// a record between the read and the rewrite.
    fn reseal_all(
        &self,
        new_fingerprint: &str,
        reseal: &mut dyn FnMut(&Note) -> Result<Reseal>,
        before_commit: &mut dyn FnMut() -> Result<()>,
    ) -> Result<()>;
}
