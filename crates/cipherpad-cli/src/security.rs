//! OS keychain backing for the note key.

use std::path::Path;

use zeroize::Zeroizing;

use cipherpad_core::codec;
use cipherpad_core::crypto::{KeyStore, SymmetricKey};
use cipherpad_core::{CipherpadError, Result};

use crate::constants::KEYCHAIN_SERVICE;

/// Note key stored as encoded text in the OS keychain.
///
/// The account is derived from the database path once, at init, and then
/// read back from the config.
pub struct KeychainKeyStore {
    account: String,
}

impl KeychainKeyStore {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry> {
        keyring::Entry::new(KEYCHAIN_SERVICE, &self.account).map_err(|e| {
            CipherpadError::PersistenceFailure(format!("Keychain entry failed: {}", e))
        })
    }
}

impl KeyStore for KeychainKeyStore {
    fn load(&self) -> Result<Option<SymmetricKey>> {
        let encoded = match self.entry()?.get_password() {
            Ok(value) => Zeroizing::new(value),
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(err) => {
                return Err(CipherpadError::PersistenceFailure(format!(
                    "Keychain read failed: {}",
                    err
                )))
            }
        };
        let bytes = Zeroizing::new(codec::decode(encoded.trim())?);
        SymmetricKey::from_slice(&bytes).map(Some)
    }

    fn store(&self, key: &SymmetricKey) -> Result<()> {
        let encoded = Zeroizing::new(codec::encode(key.as_bytes()));
        self.entry()?.set_password(&encoded).map_err(|e| {
            CipherpadError::PersistenceFailure(format!("Keychain write failed: {}", e))
        })
    }
}

/// Keychain account name for a new note database.
pub fn keychain_account(notes_path: &Path) -> String {
    let resolved = std::fs::canonicalize(notes_path).unwrap_or_else(|_| notes_path.to_path_buf());
    format!("notes:{}", resolved.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_account_is_stable_per_path() {
        let a = keychain_account(Path::new("/nonexistent/cipherpad/notes.db"));
        let b = keychain_account(Path::new("/nonexistent/cipherpad/notes.db"));
        assert_eq!(a, b);
        assert_eq!(a, "notes:/nonexistent/cipherpad/notes.db");
    }

    #[test]
    fn test_accounts_differ_per_database() {
        assert_ne!(
            keychain_account(Path::new("/nonexistent/a.db")),
            keychain_account(Path::new("/nonexistent/b.db"))
        );
    }
}
