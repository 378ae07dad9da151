use std::path::PathBuf;

use cipherpad_core::crypto::{load_or_create_key, validate_password, FileKeyStore, KeyStore};
use cipherpad_core::{ExposeSecret, FileSettingsStore, PasswordGate, SqliteNoteStore};

use crate::app::{resolve_config_path, AppContext};
use crate::cli::{InitArgs, KeystoreArg};
use crate::config::{
    default_keyfile_path, default_notes_path, read_config, settings_path_for, write_config,
    CipherpadConfig, KeystoreMode,
};
use crate::constants::env_vars;
use crate::errors::CliError;
use crate::helpers::{is_interactive, prompt_new_password};
use crate::security::{keychain_account, KeychainKeyStore};

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path()?;
    if config_path.exists() {
        let existing = read_config(&config_path)?;
        let gate = PasswordGate::new(FileSettingsStore::new(&existing.settings.path));
        if gate.has_password()? {
            return Err(already_initialized(&config_path.display().to_string()).into());
        }
    }

    let notes_path = match ctx.db_override() {
        Some(path) => PathBuf::from(path),
        None => default_notes_path()?,
    };
    let settings_path = settings_path_for(&notes_path);
    let gate = PasswordGate::new(FileSettingsStore::new(&settings_path));
    if gate.has_password()? {
        return Err(already_initialized(&settings_path.display().to_string()).into());
    }

    let (mode, keyfile_path) = match args.keystore {
        KeystoreArg::Keyfile => {
            let path = match args.keyfile.as_ref() {
                Some(path) => PathBuf::from(path),
                None => default_keyfile_path()?,
            };
            (KeystoreMode::Keyfile, Some(path))
        }
        KeystoreArg::Keychain => {
            if args.keyfile.is_some() {
                return Err(
                    CliError::invalid_input("--keyfile only applies to --keystore keyfile").into(),
                );
            }
            (KeystoreMode::Keychain, None)
        }
    };

    let password = prompt_new_password(env_vars::PASSWORD, is_interactive())?;
    validate_password(password.expose_secret())?;

    // Key and config first, credential last: a failure before the password
    // is written leaves nothing that blocks running init again.
    let store = SqliteNoteStore::open(&notes_path)?;
    let (key_store, account): (Box<dyn KeyStore>, Option<String>) = match keyfile_path.as_ref() {
        Some(path) => (Box::new(FileKeyStore::new(path)), None),
        None => {
            // The database must exist before its path is canonicalized.
            let account = keychain_account(&notes_path);
            (Box::new(KeychainKeyStore::new(account.clone())), Some(account))
        }
    };
    if let Some(recorded) = store.key_fingerprint()? {
        let existing = key_store.load()?.map(|key| key.fingerprint());
        if existing.as_deref() != Some(recorded.as_str()) {
            return Err(CliError::invalid_input(format!(
                "{} holds notes encrypted under a different key.\nHint: Restore the original key, or pass --db for a new note database.",
                notes_path.display()
            ))
            .into());
        }
    }
    load_or_create_key(key_store.as_ref())?;

    let mut config = CipherpadConfig::new(notes_path.clone(), settings_path, mode, keyfile_path);
    if let Some(account) = account {
        config = config.with_keychain_account(account);
    }
    write_config(&config_path, &config)?;

    gate.set_password(&password)?;

    if !ctx.quiet() {
        println!("Cipherpad initialized.");
        println!("  Notes:  {}", notes_path.display());
        println!("  Config: {}", config_path.display());
        match mode {
            KeystoreMode::Keyfile => {
                if let Some(path) = config.keystore.path.as_ref() {
                    println!("  Key:    {} (keep this file private)", path);
                }
            }
            KeystoreMode::Keychain => println!("  Key:    OS keychain"),
        }
    }
    Ok(())
}

fn already_initialized(location: &str) -> CliError {
    CliError::invalid_input(format!(
        "A password is already set ({}).\nHint: Use `cipherpad passwd` to change it.",
        location
    ))
}
