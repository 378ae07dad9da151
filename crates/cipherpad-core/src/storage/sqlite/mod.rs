//! SQLite note record store.
//!
//! Each row holds a plaintext title, the encoded ciphertext and IV of the
//! body, and two timestamps. The body is encrypted per note before it
//! reaches this module, so the database file itself is not encrypted.

mod row;

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

use crate::error::{CipherpadError, Result};
use crate::storage::traits::{NoteRecordStore, Reseal};
use crate::storage::types::{NewNote, Note};

use row::{NoteRow, NOTE_COLUMNS};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS notes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        encrypted_message TEXT NOT NULL,
        iv TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_notes_updated_at ON notes(updated_at);

    CREATE TABLE IF NOT EXISTS meta (
        name TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
"#;

/// `meta` row naming the key every stored ciphertext belongs to.
const KEY_FINGERPRINT: &str = "key_fingerprint";

/// SQLite-backed note record store.
///
/// Every write runs in an immediate transaction, so writers in other
/// processes are serialized against it by SQLite's own file lock.
pub struct SqliteNoteStore {
    conn: Mutex<Connection>,
    bound_key: Mutex<Option<String>>,
}

impl SqliteNoteStore {
    /// Open (or create) a note database file.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            bound_key: Mutex::new(None),
        })
    }

    /// Fingerprint of the key the stored ciphertexts belong to, once recorded.
    pub fn key_fingerprint(&self) -> Result<Option<String>> {
        let conn = self.lock_conn()?;
        Self::stored_fingerprint(&conn)
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CipherpadError::PersistenceFailure("SQLite connection poisoned".to_string()))
    }

    fn bound_key(&self) -> Option<String> {
        self.bound_key
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Start a write transaction that holds SQLite's reserved lock from the start.
    fn begin_write(conn: &mut Connection) -> Result<Transaction<'_>> {
        Ok(conn.transaction_with_behavior(TransactionBehavior::Immediate)?)
    }

    fn stored_fingerprint(conn: &Connection) -> Result<Option<String>> {
        Ok(conn
            .query_row(
                "SELECT value FROM meta WHERE name = ?1",
                [KEY_FINGERPRINT],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn record_fingerprint(conn: &Connection, fingerprint: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO meta (name, value) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value",
            params![KEY_FINGERPRINT, fingerprint],
        )?;
        Ok(())
    }

    /// Refuse the write if the database belongs to another key.
    fn check_key(&self, conn: &Connection) -> Result<()> {
        let Some(bound) = self.bound_key() else {
            return Ok(());
        };
        match Self::stored_fingerprint(conn)? {
            Some(stored) if stored == bound => Ok(()),
            Some(_) => {
                tracing::warn!("write refused: note database belongs to a different key");
                Err(CipherpadError::KeyMismatch)
            }
            None => Self::record_fingerprint(conn, &bound),
        }
    }

    fn now() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Option<Note>> {
        let row = conn
            .query_row(
                &format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS),
                [id],
                NoteRow::from_row,
            )
            .optional()?;
        Ok(row.map(Note::from))
    }

    fn fetch_all(conn: &Connection) -> Result<Vec<Note>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM notes ORDER BY updated_at DESC, id DESC",
            NOTE_COLUMNS
        ))?;
        let rows = stmt.query_map([], NoteRow::from_row)?;

        let mut notes = Vec::new();
        for row in rows {
            notes.push(Note::from(row?));
        }
        Ok(notes)
    }
}

impl NoteRecordStore for SqliteNoteStore {
    fn bind_key(&self, fingerprint: &str) {
        *self.bound_key.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(fingerprint.to_string());
    }

    fn insert(&self, note: &NewNote) -> Result<Note> {
        let mut conn = self.lock_conn()?;
        let tx = Self::begin_write(&mut conn)?;
        self.check_key(&tx)?;
        tx.execute(
            "INSERT INTO notes (title, encrypted_message, iv, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![note.title, note.encrypted_message, note.iv, Self::now()],
        )?;
        let id = tx.last_insert_rowid();
        let inserted = Self::fetch(&tx, id)?.ok_or_else(|| {
            CipherpadError::PersistenceFailure(format!("Inserted note {} not readable", id))
        })?;
        tx.commit()?;
        tracing::debug!(note_id = id, "note record inserted");
        Ok(inserted)
    }

    fn update(&self, note: &Note) -> Result<Note> {
        let mut conn = self.lock_conn()?;
        let tx = Self::begin_write(&mut conn)?;
        self.check_key(&tx)?;
        let changed = tx.execute(
            "UPDATE notes
             SET title = ?1, encrypted_message = ?2, iv = ?3, updated_at = ?4
             WHERE id = ?5",
            params![note.title, note.encrypted_message, note.iv, Self::now(), note.id],
        )?;
        if changed == 0 {
            return Err(CipherpadError::NoteNotFound(note.id));
        }
        let updated = Self::fetch(&tx, note.id)?.ok_or(CipherpadError::NoteNotFound(note.id))?;
        tx.commit()?;
        tracing::debug!(note_id = note.id, "note record updated");
        Ok(updated)
    }

    fn get(&self, id: i64) -> Result<Option<Note>> {
        let conn = self.lock_conn()?;
        Self::fetch(&conn, id)
    }

    fn list(&self) -> Result<Vec<Note>> {
        let conn = self.lock_conn()?;
        Self::fetch_all(&conn)
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.lock_conn()?;
        let removed = conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;
        if removed > 0 {
            tracing::debug!(note_id = id, "note record deleted");
        }
        Ok(removed > 0)
    }

    fn replace_ciphertexts(&self, notes: &[Note]) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = Self::begin_write(&mut conn)?;
        self.check_key(&tx)?;
        for note in notes {
            let changed = tx.execute(
                "UPDATE notes SET encrypted_message = ?1, iv = ?2 WHERE id = ?3",
                params![note.encrypted_message, note.iv, note.id],
            )?;
            if changed == 0 {
                // Dropping the transaction rolls back every earlier row.
                return Err(CipherpadError::NoteNotFound(note.id));
            }
        }
        tx.commit()?;
        tracing::debug!(count = notes.len(), "note ciphertexts replaced");
        Ok(())
    }

    fn reseal_all(
        &self,
        new_fingerprint: &str,
        reseal: &mut dyn FnMut(&Note) -> Result<Reseal>,
        before_commit: &mut dyn FnMut() -> Result<()>,
    ) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = Self::begin_write(&mut conn)?;
        self.check_key(&tx)?;

        let mut replaced = 0usize;
        for note in Self::fetch_all(&tx)? {
            if let Reseal::Replace { encrypted_message, iv } = reseal(&note)? {
                tx.execute(
                    "UPDATE notes SET encrypted_message = ?1, iv = ?2 WHERE id = ?3",
                    params![encrypted_message, iv, note.id],
                )?;
                replaced += 1;
            }
        }
        Self::record_fingerprint(&tx, new_fingerprint)?;
        before_commit()?;
        tx.commit()?;

        self.bind_key(new_fingerprint);
        tracing::debug!(count = replaced, "note records resealed");
        Ok(())
    }
}
