//! Note row type for database queries.

use chrono::{DateTime, Utc};

use crate::storage::types::Note;

/// Column list shared by every query that materializes a [`NoteRow`].
pub const NOTE_COLUMNS: &str = "id, title, encrypted_message, iv, created_at, updated_at";

/// Raw row data from the notes table, before parsing into domain types.
#[derive(Debug)]
pub struct NoteRow {
    pub id: i64,
    pub title: String,
    pub encrypted_message: String,
    pub iv: String,
    pub created_at: String,
    pub updated_at: String,
}

impl NoteRow {
    /// Read a row selected with [`NOTE_COLUMNS`].
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            encrypted_message: row.get(2)?,
            iv: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

/// Parse a stored timestamp; an unparseable value falls back to the epoch.
///
/// Timestamps are display metadata. A damaged one is reported per note and
/// never hides the record or the rest of the listing.
fn parse_timestamp(id: i64, value: &str, column: &'static str) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(err) => {
            tracing::warn!(note_id = id, column, error = %err, "unparseable note timestamp");
            DateTime::<Utc>::default()
        }
    }
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        let created_at = parse_timestamp(row.id, &row.created_at, "created_at");
        let updated_at = parse_timestamp(row.id, &row.updated_at, "updated_at");

        Note {
            id: row.id,
            title: row.title,
            encrypted_message: row.encrypted_message,
            iv: row.iv,
            created_at,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(created_at: &str) -> NoteRow {
        NoteRow {
            id: 3,
            title: "t".to_string(),
            encrypted_message: "Y3Q=".to_string(),
            iv: "aXY=".to_string(),
            created_at: created_at.to_string(),
            updated_at: "2026-01-02T03:04:05Z".to_string(),
        }
    }

    #[test]
    fn test_row_converts() {
        let note = Note::from(row("2026-01-01T00:00:00Z"));
        assert_eq!(note.id, 3);
        assert_eq!(note.created_at.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_bad_timestamp_falls_back_to_epoch() {
        let note = Note::from(row("yesterday"));
        assert_eq!(note.created_at, DateTime::<Utc>::default());
        assert_eq!(note.updated_at.to_rfc3339(), "2026-01-02T03:04:05+00:00");
        assert_eq!(note.title, "t");
    }
}
