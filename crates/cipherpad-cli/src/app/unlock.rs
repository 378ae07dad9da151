//! Password prompting and session unlock with retry logic.

use cipherpad_core::crypto::KeyStore;
use cipherpad_core::{CipherpadError, PasswordGate, Session, SettingsStore};

use crate::constants::{env_vars, MAX_PASSWORD_ATTEMPTS};
use crate::errors::CliError;
use crate::helpers::{is_interactive, prompt_password};

/// Verify the password and load the note key.
///
/// Interactive sessions get a few attempts; a password from the environment
/// gets exactly one.
pub fn unlock_session<S: SettingsStore>(
    gate: &PasswordGate<S>,
    key_store: &dyn KeyStore,
) -> anyhow::Result<Session> {
    if !gate.has_password()? {
        return Err(CliError::not_found(
            "No password has been set",
            "Hint: Run `cipherpad init` first.",
        )
        .into());
    }

    let interactive = is_interactive();
    let scripted = std::env::var(env_vars::PASSWORD).is_ok_and(|v| !v.trim().is_empty());
    let max_attempts = if interactive && !scripted {
        MAX_PASSWORD_ATTEMPTS
    } else {
        1
    };
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let candidate = prompt_password(interactive)?;
        match Session::unlock(gate, key_store, &candidate) {
            Ok(session) => return Ok(session),
            Err(CipherpadError::IncorrectPassword) => {
                let remaining = max_attempts.saturating_sub(attempts);
                if remaining == 0 {
                    if max_attempts == 1 {
                        return Err(CliError::auth_failed("Incorrect password.").into());
                    }
                    return Err(CliError::auth_failed_with_hint(
                        "Too many failed password attempts.",
                        "Hint: If you forgot your password, your notes cannot be recovered.",
                    )
                    .into());
                }
                eprintln!(
                    "Incorrect password. {} attempt{} remaining.",
                    remaining,
                    if remaining == 1 { "" } else { "s" }
                );
            }
            Err(err) => return Err(err.into()),
        }
    }
}
