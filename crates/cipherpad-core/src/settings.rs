//! Key-value settings store for the password credential.
//!
//! The credential is two text values (`passwordHash`, `password_salt`) that
//! must only ever change together. [`SettingsStore::put_all`] is therefore an
//! atomic batch: after it returns, either every pair is visible or none is.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::error::{CipherpadError, Result};

/// Settings key holding the encoded password digest.
pub const PASSWORD_HASH_KEY: &str = "passwordHash";

/// Settings key holding the encoded password salt.
pub const PASSWORD_SALT_KEY: &str = "password_salt";

/// Persisted key-value settings.
pub trait SettingsStore: Send + Sync {
    /// Read one value.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write every pair atomically.
    ///
    /// # Errors
    ///
    /// Returns `CipherpadError::PersistenceFailure` if the batch could not be
    /// written. In that case none of the pairs are visible.
    fn put_all(&self, entries: &[(&str, String)]) -> Result<()>;
}

/// Settings kept as a JSON object in a single file.
///
/// Every write replaces the whole file through a synced temp file and a
/// rename, so a crash mid-write leaves the previous map intact.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(CipherpadError::PersistenceFailure(format!(
                    "Failed to read settings {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        Ok(serde_json::from_str(&contents)?)
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| CipherpadError::PersistenceFailure("Settings lock poisoned".to_string()))
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map()?.remove(key))
    }

    fn put_all(&self, entries: &[(&str, String)]) -> Result<()> {
        let _guard = self.lock_writes()?;
        let mut map = self.read_map()?;
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        let contents = serde_json::to_vec_pretty(&map)?;
        crate::fs::write_atomic(&self.path, &contents).map_err(|e| {
            CipherpadError::PersistenceFailure(format!(
                "Failed to write settings {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// In-memory settings for tests and embedders.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: Mutex<BTreeMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `put_all` fail without writing anything.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Write a single raw value, bypassing batching.
    ///
    /// Lets tests and migrations stage states a correct writer never produces.
    pub fn insert_raw(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| CipherpadError::PersistenceFailure("Settings store poisoned".to_string()))
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn put_all(&self, entries: &[(&str, String)]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CipherpadError::PersistenceFailure(
                "Settings store rejected write".to_string(),
            ));
        }
        let mut values = self.lock()?;
        for (key, value) in entries {
            values.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}
