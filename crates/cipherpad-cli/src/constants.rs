//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, password, note).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong password, too many attempts).
    pub const AUTH_FAILED: i32 = 5;
}

/// Environment variables read by the CLI.
pub mod env_vars {
    pub const CONFIG: &str = "CIPHERPAD_CONFIG";
    pub const PASSWORD: &str = "CIPHERPAD_PASSWORD";
    /// Only read by `passwd`, for scripting.
    pub const NEW_PASSWORD: &str = "CIPHERPAD_NEW_PASSWORD";
    pub const LOG: &str = "CIPHERPAD_LOG";
}

/// Keychain service name for the note key.
pub const KEYCHAIN_SERVICE: &str = "cipherpad";

/// Password prompts allowed per interactive unlock.
pub const MAX_PASSWORD_ATTEMPTS: u32 = 3;
