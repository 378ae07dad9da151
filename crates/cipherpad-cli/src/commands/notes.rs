//! Note commands: add, list, show, edit, delete.

use crate::app::AppContext;
use crate::cli::{AddArgs, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::errors::CliError;
use crate::helpers::read_note_body;
use crate::output::{print_note, print_note_list};

pub fn handle_add(ctx: &AppContext, args: &AddArgs) -> anyhow::Result<()> {
    let notebook = ctx.open_notebook()?;
    let body = read_note_body(args.body.clone())?;
    let note = notebook.add(&args.title, &body)?;
    notebook.lock();

    if ctx.quiet() {
        println!("{}", note.id);
    } else {
        println!("Added note {}", note.id);
    }
    Ok(())
}

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let notebook = ctx.open_notebook()?;
    let notes = notebook.list()?;
    notebook.lock();
    print_note_list(&notes, args.json, ctx.quiet())
}

pub fn handle_show(ctx: &AppContext, args: &ShowArgs) -> anyhow::Result<()> {
    let notebook = ctx.open_notebook()?;
    let opened = notebook.read(args.id)?;
    notebook.lock();
    print_note(&opened, args.json, ctx.quiet())
}

pub fn handle_edit(ctx: &AppContext, args: &EditArgs) -> anyhow::Result<()> {
    if args.title.is_none() && args.body.is_none() {
        return Err(CliError::invalid_input("Nothing to change: pass --title and/or --body").into());
    }
    let notebook = ctx.open_notebook()?;
    let note = notebook.edit(args.id, args.title.as_deref(), args.body.as_deref())?;
    notebook.lock();

    if !ctx.quiet() {
        println!("Edited note {}", note.id);
    }
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, args: &DeleteArgs) -> anyhow::Result<()> {
    let notebook = ctx.open_notebook()?;
    notebook.delete(args.id)?;
    notebook.lock();

    if !ctx.quiet() {
        println!("Deleted note {}", args.id);
    }
    Ok(())
}
