//! Input helper functions for the CLI.

use std::io::{self, IsTerminal, Read};

use dialoguer::Password;

use cipherpad_core::SecretString;

use crate::constants::env_vars;

/// Read a non-blank value from an environment variable.
fn env_secret(name: &str) -> Option<SecretString> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(SecretString::from)
}

/// Prompt for the password, or read it from `CIPHERPAD_PASSWORD`.
pub fn prompt_password(interactive: bool) -> anyhow::Result<SecretString> {
    if let Some(value) = env_secret(env_vars::PASSWORD) {
        return Ok(value);
    }
    if !interactive {
        return Err(anyhow::anyhow!(
            "No password provided and no TTY available. Set {}.",
            env_vars::PASSWORD
        ));
    }
    Password::new()
        .with_prompt("Password")
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Prompt for a new password with confirmation, or read it from `env_var`.
pub fn prompt_new_password(env_var: &str, interactive: bool) -> anyhow::Result<SecretString> {
    if let Some(value) = env_secret(env_var) {
        return Ok(value);
    }
    if !interactive {
        return Err(anyhow::anyhow!(
            "No password provided and no TTY available. Set {}.",
            env_var
        ));
    }
    Password::new()
        .with_prompt("New password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Resolve a note body from `--body`, falling back to stdin.
pub fn read_note_body(body: Option<String>) -> anyhow::Result<String> {
    if let Some(body) = body {
        return Ok(body);
    }
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        eprintln!("Enter note body, then Ctrl-D:");
    }
    let mut buffer = String::new();
    stdin
        .read_to_string(&mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to read note body from stdin: {}", e))?;
    Ok(buffer.trim_end_matches(['\r', '\n']).to_string())
}

/// Whether prompts can be shown.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal()
}
