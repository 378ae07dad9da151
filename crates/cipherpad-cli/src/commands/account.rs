//! Password change and key rotation.

use crate::app::AppContext;
use crate::constants::env_vars;
use crate::helpers::{is_interactive, prompt_new_password, prompt_password};

pub fn handle_passwd(ctx: &AppContext) -> anyhow::Result<()> {
    let gate = ctx.gate()?;
    let interactive = is_interactive();
    let current = prompt_password(interactive)?;
    let new_password = prompt_new_password(env_vars::NEW_PASSWORD, interactive)?;
    gate.change_password(&current, &new_password)?;

    if !ctx.quiet() {
        println!("Password changed. Existing notes are unaffected.");
    }
    Ok(())
}

pub fn handle_rekey(ctx: &AppContext) -> anyhow::Result<()> {
    let mut notebook = ctx.open_notebook()?;
    let key_store = ctx.key_store()?;
    let report = notebook.rotate_key(key_store.as_ref())?;
    notebook.lock();

    if !ctx.quiet() {
        println!("Re-encrypted {} note(s) under a new key.", report.reencrypted);
    }
    if !report.skipped.is_empty() {
        let ids: Vec<String> = report.skipped.iter().map(|id| id.to_string()).collect();
        eprintln!(
            "Warning: left {} unreadable note(s) untouched: {}",
            report.skipped.len(),
            ids.join(", ")
        );
    }
    Ok(())
}
