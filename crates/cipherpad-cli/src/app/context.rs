//! Application context for the Cipherpad CLI.
//!
//! Provides a unified context that combines CLI arguments with the
//! lazily-loaded config file.

use std::path::{Path, PathBuf};

use once_cell::unsync::OnceCell;

use cipherpad_core::crypto::{FileKeyStore, KeyStore};
use cipherpad_core::{FileSettingsStore, Notebook, PasswordGate, SqliteNoteStore};

use crate::cli::Cli;
use crate::config::{default_keyfile_path, CipherpadConfig, KeystoreMode};
use crate::security::{keychain_account, KeychainKeyStore};

use super::resolver::load_config;
use super::unlock::unlock_session;

/// Application context that bundles CLI args with configuration.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<CipherpadConfig>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Note database path given on the command line or environment.
    pub fn db_override(&self) -> Option<&str> {
        self.cli.db.as_deref()
    }

    /// Get the configuration, loading it lazily if needed.
    pub fn config(&self) -> anyhow::Result<&CipherpadConfig> {
        self.config.get_or_try_init(load_config)
    }

    /// Note database path: `--db` / `CIPHERPAD_DB`, else the config.
    pub fn notes_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = self.db_override() {
            return Ok(PathBuf::from(path));
        }
        Ok(PathBuf::from(&self.config()?.notes.path))
    }

    /// Password gate over the configured settings file.
    pub fn gate(&self) -> anyhow::Result<PasswordGate<FileSettingsStore>> {
        let path = PathBuf::from(&self.config()?.settings.path);
        Ok(PasswordGate::new(FileSettingsStore::new(path)))
    }

    /// Key store selected by `[keystore] mode`.
    pub fn key_store(&self) -> anyhow::Result<Box<dyn KeyStore>> {
        let config = self.config()?;
        match config.keystore.mode {
            KeystoreMode::Keyfile => {
                let path = match config.keystore.path.as_ref() {
                    Some(path) => PathBuf::from(path),
                    None => default_keyfile_path()?,
                };
                Ok(Box::new(FileKeyStore::new(path)))
            }
            KeystoreMode::Keychain => {
                let account = match config.keystore.account.as_ref() {
                    Some(account) => account.clone(),
                    None => keychain_account(Path::new(&config.notes.path)),
                };
                Ok(Box::new(KeychainKeyStore::new(account)))
            }
        }
    }

    /// Unlock with the user's password and open the note database.
    pub fn open_notebook(&self) -> anyhow::Result<Notebook<SqliteNoteStore>> {
        let gate = self.gate()?;
        let key_store = self.key_store()?;
        let session = unlock_session(&gate, key_store.as_ref())?;
        let store = SqliteNoteStore::open(&self.notes_path()?)?;
        Ok(Notebook::new(store, session))
    }
}
