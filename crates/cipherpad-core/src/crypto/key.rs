//! The note encryption key and where it lives.
//!
//! The key is 256 random bits generated once per installation. It does not
//! depend on the login password; it is kept in a [`KeyStore`] and handed to a
//! session only after the password gate has accepted the user.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use sha2::{Digest, Sha256};
use zeroize::{ZeroizeOnDrop, Zeroizing};

use super::fill_random;
use crate::codec;
use crate::error::{CipherpadError, Result};

/// Length of the note encryption key in bytes (AES-256).
pub const KEY_LENGTH: usize = 32;

/// Symmetric key used for note encryption.
///
/// Key bytes are zeroized from memory when the value is dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct SymmetricKey {
    key: [u8; KEY_LENGTH],
}

impl SymmetricKey {
    /// Generate a fresh random key.
    ///
    /// # Errors
    ///
    /// Returns `CipherpadError::CryptoUnavailable` if the random source fails.
    pub fn generate() -> Result<Self> {
        let mut key = [0u8; KEY_LENGTH];
        fill_random(&mut key)?;
        Ok(Self { key })
    }

    /// Create a key from raw bytes.
    ///
    /// # Security
    ///
    /// The caller is responsible for ensuring the bytes come from a secure source.
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Create a key from a slice that must be exactly [`KEY_LENGTH`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let key: [u8; KEY_LENGTH] = bytes.try_into().map_err(|_| {
            CipherpadError::InvalidInput(format!(
                "Key must be {} bytes (got {})",
                KEY_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self { key })
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }

    /// Short public identifier of this key.
    ///
    /// Derived with a domain-separated SHA-256, so it can be stored next to
    /// the notes without revealing anything about the key bytes.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(FINGERPRINT_CONTEXT);
        hasher.update(self.key);
        let digest = hasher.finalize();
        codec::encode(&digest[..FINGERPRINT_LENGTH])
    }
}

const FINGERPRINT_CONTEXT: &[u8] = b"cipherpad note key fingerprint v1";
const FINGERPRINT_LENGTH: usize = 12;

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Secret storage for the note encryption key.
///
/// Implementations must keep the key out of the note database.
pub trait KeyStore: Send + Sync {
    /// Load the stored key, or `None` if no key has been stored yet.
    fn load(&self) -> Result<Option<SymmetricKey>>;

    /// Store `key`, replacing any previous key.
    fn store(&self, key: &SymmetricKey) -> Result<()>;
}

/// Load the installation key, creating and storing one on first use.
///
/// Only first-run setup calls this. Unlocking an existing installation uses
/// [`KeyStore::load`] and treats a missing key as an error.
///
/// The same key is returned on every call for the same store, across restarts.
///
/// # Errors
///
/// - `CryptoUnavailable` if a new key is needed and the random source fails
/// - `PersistenceFailure` if a new key cannot be stored
pub fn load_or_create_key(store: &dyn KeyStore) -> Result<SymmetricKey> {
    if let Some(key) = store.load()? {
        return Ok(key);
    }
    let key = SymmetricKey::generate()?;
    store.store(&key)?;
    tracing::debug!("generated new note encryption key");
    Ok(key)
}

/// Key kept in a dedicated owner-only file, separate from the note database.
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    path: PathBuf,
}

impl FileKeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyStore for FileKeyStore {
    fn load(&self) -> Result<Option<SymmetricKey>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => Zeroizing::new(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CipherpadError::PersistenceFailure(format!(
                    "Failed to read key file {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        SymmetricKey::from_slice(&bytes).map(Some)
    }

    fn store(&self, key: &SymmetricKey) -> Result<()> {
        crate::fs::write_atomic(&self.path, key.as_bytes()).map_err(|e| {
            CipherpadError::PersistenceFailure(format!(
                "Failed to write key file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// In-memory key store for tests and embedders that manage secrets themselves.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    key: Mutex<Option<SymmetricKey>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: SymmetricKey) -> Self {
        Self {
            key: Mutex::new(Some(key)),
        }
    }
}

impl KeyStore for MemoryKeyStore {
    fn load(&self) -> Result<Option<SymmetricKey>> {
        let guard = self
            .key
            .lock()
            .map_err(|_| CipherpadError::PersistenceFailure("Key store poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn store(&self, key: &SymmetricKey) -> Result<()> {
        let mut guard = self
            .key
            .lock()
            .map_err(|_| CipherpadError::PersistenceFailure("Key store poisoned".to_string()))?;
        *guard = Some(key.clone());
        Ok(())
    }
}
