use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct CipherpadConfig {
    pub notes: NotesSection,
    pub settings: SettingsSection,
    pub keystore: KeystoreSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotesSection {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsSection {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeystoreSection {
    pub mode: KeystoreMode,
    pub path: Option<String>,
    /// Keychain account holding the key, recorded at init.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KeystoreMode {
    Keyfile,
    Keychain,
}

impl CipherpadConfig {
    pub fn new(
        notes_path: PathBuf,
        settings_path: PathBuf,
        mode: KeystoreMode,
        keyfile_path: Option<PathBuf>,
    ) -> Self {
        Self {
            notes: NotesSection {
                path: notes_path.to_string_lossy().to_string(),
            },
            settings: SettingsSection {
                path: settings_path.to_string_lossy().to_string(),
            },
            keystore: KeystoreSection {
                mode,
                path: keyfile_path.map(|path| path.to_string_lossy().to_string()),
                account: None,
            },
        }
    }

    pub fn with_keychain_account(mut self, account: String) -> Self {
        self.keystore.account = Some(account);
        self
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_notes_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("notes.db"))
}

pub fn default_keyfile_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("notes.key"))
}

/// Settings live next to the note database so `--db` keeps an install together.
pub fn settings_path_for(notes_path: &Path) -> PathBuf {
    match notes_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join("settings.json"),
        _ => PathBuf::from("settings.json"),
    }
}

pub fn read_config(path: &Path) -> anyhow::Result<CipherpadConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &CipherpadConfig) -> anyhow::Result<()> {
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    cipherpad_core::fs::write_atomic(path, contents.as_bytes())
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("cipherpad"));
        }
    }
    Ok(home_dir()?.join(".config").join("cipherpad"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("cipherpad"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("cipherpad"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
