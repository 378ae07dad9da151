//! Path resolution for the config file.

use std::path::{Path, PathBuf};

use crate::config::{default_config_path, read_config, CipherpadConfig};
use crate::constants::env_vars;
use crate::errors::CliError;

/// Resolve the config file path, checking CIPHERPAD_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(env_vars::CONFIG) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Load the config, failing with a not-found error before `init` has run.
pub fn load_config() -> anyhow::Result<CipherpadConfig> {
    let config_path = resolve_config_path()?;
    if !config_path.exists() {
        return Err(missing_config_error(&config_path).into());
    }
    read_config(&config_path)
}

fn missing_config_error(config_path: &Path) -> CliError {
    CliError::not_found(
        format!("No cipherpad config found at {}", config_path.display()),
        "Hint: Run `cipherpad init` to set a password.",
    )
}
