//! Output formatting helpers for the CLI.

use chrono::{DateTime, Local, Utc};
use comfy_table::{presets, ContentArrangement, Table};

use cipherpad_core::{NoteBody, OpenedNote};

/// Shown in place of a body that cannot be decrypted.
pub const UNREADABLE_PLACEHOLDER: &str = "Error decrypting note";

const SUMMARY_CHARS: usize = 60;

/// Body text for display, or the placeholder if it cannot be read.
pub fn body_text(body: &NoteBody) -> &str {
    body.as_text().unwrap_or(UNREADABLE_PLACEHOLDER)
}

/// First line of the body, shortened for list views.
pub fn body_summary(body: &NoteBody) -> String {
    let first_line = body_text(body).lines().next().unwrap_or("");
    let mut summary: String = first_line.chars().take(SUMMARY_CHARS).collect();
    if first_line.chars().count() > SUMMARY_CHARS || body_text(body).lines().nth(1).is_some() {
        summary.push('…');
    }
    summary
}

fn local_time(value: &DateTime<Utc>) -> String {
    value.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Convert a note to JSON for output.
pub fn note_json(opened: &OpenedNote) -> serde_json::Value {
    let (body, error) = match &opened.body {
        NoteBody::Readable(text) => (Some(text.as_str()), None),
        NoteBody::Unreadable(reason) => (None, Some(reason.to_string())),
    };
    serde_json::json!({
        "id": opened.note.id,
        "title": opened.note.title,
        "body": body,
        "error": error,
        "created_at": opened.note.created_at,
        "updated_at": opened.note.updated_at,
    })
}

/// Print a single note in human-readable format.
pub fn print_note(opened: &OpenedNote, json: bool, quiet: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&note_json(opened))?);
        return Ok(());
    }
    if !quiet {
        println!("ID: {}", opened.note.id);
        println!("Title: {}", opened.note.title);
        println!("Created: {}", local_time(&opened.note.created_at));
        println!("Updated: {}", local_time(&opened.note.updated_at));
        println!();
    }
    println!("{}", body_text(&opened.body));
    Ok(())
}

/// Print a list of notes as a borderless table (or JSON array).
pub fn print_note_list(notes: &[OpenedNote], json: bool, quiet: bool) -> anyhow::Result<()> {
    if json {
        let values: Vec<serde_json::Value> = notes.iter().map(note_json).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }
    if notes.is_empty() {
        if !quiet {
            println!("No notes yet. Add one with `cipherpad add --title <TITLE>`.");
        }
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if !quiet {
        table.set_header(vec!["ID", "UPDATED", "TITLE", "BODY"]);
    }
    for opened in notes {
        table.add_row(vec![
            opened.note.id.to_string(),
            local_time(&opened.note.updated_at),
            opened.note.title.clone(),
            body_summary(&opened.body),
        ]);
    }
    println!("{}", table);
    Ok(())
}
