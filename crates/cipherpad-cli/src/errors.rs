//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use cipherpad_core::CipherpadError;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, password, note)
    NotFound { message: String, hint: String },

    /// Authentication failed (wrong password, too many attempts)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and optional hint.
    pub fn auth_failed(message: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: None,
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
        }
    }

    /// Print error message to stderr and exit with appropriate code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(self.exit_code())
    }
}

/// Map core errors that the user can act on to a `CliError`.
pub fn classify(err: &CipherpadError) -> Option<CliError> {
    match err {
        CipherpadError::NoteNotFound(id) => Some(CliError::not_found(
            format!("Note {} not found", id),
            "Hint: Run `cipherpad list` to find note IDs.",
        )),
        CipherpadError::NoCredentialSet => Some(CliError::not_found(
            "No password has been set",
            "Hint: Run `cipherpad init` first.",
        )),
        CipherpadError::NoteKeyMissing => Some(CliError::not_found(
            "The note key is missing from its key store",
            "Hint: Restore the key file or keychain entry from a backup; notes cannot be decrypted without it.",
        )),
        CipherpadError::KeyMismatch => Some(CliError::auth_failed_with_hint(
            "The note database is encrypted under a different key than this session holds.",
            "Hint: Another `cipherpad rekey` may have run; try again.",
        )),
        CipherpadError::IncorrectPassword => Some(CliError::auth_failed("Incorrect password.")),
        CipherpadError::InvalidInput(message) => Some(CliError::invalid_input(message.clone())),
        _ => None,
    }
}
