//! Password gate: set and verify the app password.
//!
//! Only `SHA-512(salt || password)` and the salt are persisted. Setting a
//! password always draws a new salt, and the digest/salt pair is written as
//! one atomic batch. A store holding only half of a pair is reported as
//! `IncompleteCredential` and never verified against.

use std::sync::{Mutex, MutexGuard};

use secrecy::{ExposeSecret, SecretString};

use crate::codec;
use crate::crypto::{
    generate_salt, hash_password, validate_password, PasswordDigest, Salt, DIGEST_LENGTH,
    SALT_LENGTH,
};
use crate::error::{CipherpadError, Result};
use crate::settings::{SettingsStore, PASSWORD_HASH_KEY, PASSWORD_SALT_KEY};

/// Stored password credential, decoded.
struct Credential {
    salt: Salt,
    digest: PasswordDigest,
}

/// Authentication against a password kept in a [`SettingsStore`].
#[derive(Debug)]
pub struct PasswordGate<S: SettingsStore> {
    store: S,
    write_lock: Mutex<()>,
}

impl<S: SettingsStore> PasswordGate<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// The underlying settings store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether a password has been configured.
    ///
    /// # Errors
    ///
    /// Returns `IncompleteCredential` if only half of the credential exists.
    pub fn has_password(&self) -> Result<bool> {
        match self.load_credential() {
            Ok(_) => Ok(true),
            Err(CipherpadError::NoCredentialSet) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Set a new password, replacing any existing one.
    ///
    /// Concurrent calls are serialized; their salt/hash/persist steps never
    /// interleave.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the password is empty
    /// - `CryptoUnavailable` if no salt can be generated
    /// - `PersistenceFailure` if the store cannot write, or reads back a
    ///   different pair than was written
    pub fn set_password(&self, new_password: &SecretString) -> Result<()> {
        validate_password(new_password.expose_secret())?;

        let _guard = self.lock_writes()?;
        self.write_credential(new_password)
    }

    /// Check a candidate password against the stored credential.
    ///
    /// Returns `Ok(false)` on mismatch. The digest comparison runs in constant
    /// time.
    ///
    /// # Errors
    ///
    /// - `NoCredentialSet` if no password was ever configured
    /// - `IncompleteCredential` if the stored pair is half-written or malformed
    pub fn verify_password(&self, candidate: &SecretString) -> Result<bool> {
        let credential = self.load_credential()?;
        let digest = hash_password(candidate.expose_secret(), &credential.salt);
        Ok(digest.matches(&credential.digest))
    }

    /// Replace the password after confirming the current one.
    ///
    /// The check and the write happen under the same lock, so two changes
    /// from the same old password cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns `IncorrectPassword` if `current` does not verify, plus every
    /// error of [`PasswordGate::set_password`].
    pub fn change_password(&self, current: &SecretString, new_password: &SecretString) -> Result<()> {
        validate_password(new_password.expose_secret())?;

        let _guard = self.lock_writes()?;
        if !self.verify_password(current)? {
            return Err(CipherpadError::IncorrectPassword);
        }
        self.write_credential(new_password)
    }

    /// Salt, hash and persist. Callers hold the write lock.
    fn write_credential(&self, new_password: &SecretString) -> Result<()> {
        let salt = generate_salt()?;
        let digest = hash_password(new_password.expose_secret(), &salt);

        let encoded_hash = codec::encode(digest.as_bytes());
        let encoded_salt = codec::encode(salt.as_bytes());
        self.store.put_all(&[
            (PASSWORD_HASH_KEY, encoded_hash.clone()),
            (PASSWORD_SALT_KEY, encoded_salt.clone()),
        ])?;

        let stored_hash = self.store.get(PASSWORD_HASH_KEY)?;
        let stored_salt = self.store.get(PASSWORD_SALT_KEY)?;
        if stored_hash.as_deref() != Some(encoded_hash.as_str())
            || stored_salt.as_deref() != Some(encoded_salt.as_str())
        {
            return Err(CipherpadError::PersistenceFailure(
                "Credential read back does not match what was written".to_string(),
            ));
        }

        tracing::debug!("password credential written");
        Ok(())
    }

    fn load_credential(&self) -> Result<Credential> {
        let hash = self.store.get(PASSWORD_HASH_KEY)?;
        let salt = self.store.get(PASSWORD_SALT_KEY)?;

        let (hash, salt) = match (hash, salt) {
            (Some(hash), Some(salt)) => (hash, salt),
            (None, None) => return Err(CipherpadError::NoCredentialSet),
            (Some(_), None) => {
                return Err(CipherpadError::IncompleteCredential(
                    "password hash present without salt".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(CipherpadError::IncompleteCredential(
                    "password salt present without hash".to_string(),
                ))
            }
        };

        let digest = codec::decode_array::<DIGEST_LENGTH>(&hash, "password hash")
            .map_err(|e| CipherpadError::IncompleteCredential(e.to_string()))?;
        let salt = codec::decode_array::<SALT_LENGTH>(&salt, "password salt")
            .map_err(|e| CipherpadError::IncompleteCredential(e.to_string()))?;

        Ok(Credential {
            salt: Salt::from_bytes(salt),
            digest: PasswordDigest::from_bytes(digest),
        })
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| CipherpadError::PersistenceFailure("Password lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettingsStore;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn test_set_then_verify() {
        let gate = PasswordGate::new(MemorySettingsStore::new());
        gate.set_password(&secret("secret123")).unwrap();

        assert!(gate.verify_password(&secret("secret123")).unwrap());
        assert!(!gate.verify_password(&secret("wrong")).unwrap());
    }

    #[test]
    fn test_verify_without_password_is_no_credential() {
        let gate = PasswordGate::new(MemorySettingsStore::new());
        let result = gate.verify_password(&secret("anything"));
        assert!(matches!(result, Err(CipherpadError::NoCredentialSet)));
        assert!(!gate.has_password().unwrap());
    }

    #[test]
    fn test_salt_and_hash_change_on_every_set() {
        let gate = PasswordGate::new(MemorySettingsStore::new());

        gate.set_password(&secret("same")).unwrap();
        let hash1 = gate.store().get(PASSWORD_HASH_KEY).unwrap().unwrap();
        let salt1 = gate.store().get(PASSWORD_SALT_KEY).unwrap().unwrap();

        gate.set_password(&secret("same")).unwrap();
        let hash2 = gate.store().get(PASSWORD_HASH_KEY).unwrap().unwrap();
        let salt2 = gate.store().get(PASSWORD_SALT_KEY).unwrap().unwrap();

        assert_ne!(salt1, salt2);
        assert_ne!(hash1, hash2);
        assert!(gate.verify_password(&secret("same")).unwrap());
    }

    #[test]
    fn test_plaintext_password_not_stored() {
        let gate = PasswordGate::new(MemorySettingsStore::new());
        gate.set_password(&secret("hunter2-hunter2")).unwrap();

        let hash = gate.store().get(PASSWORD_HASH_KEY).unwrap().unwrap();
        let salt = gate.store().get(PASSWORD_SALT_KEY).unwrap().unwrap();
        assert!(!hash.contains("hunter2"));
        assert!(!salt.contains("hunter2"));
        assert_eq!(codec::decode(&hash).unwrap().len(), DIGEST_LENGTH);
        assert_eq!(codec::decode(&salt).unwrap().len(), SALT_LENGTH);
    }

    #[test]
    fn test_failed_write_keeps_previous_password() {
        let gate = PasswordGate::new(MemorySettingsStore::new());
        gate.set_password(&secret("old-password")).unwrap();

        gate.store().fail_writes(true);
        let result = gate.set_password(&secret("new-password"));
        assert!(matches!(result, Err(CipherpadError::PersistenceFailure(_))));

        gate.store().fail_writes(false);
        assert!(gate.verify_password(&secret("old-password")).unwrap());
        assert!(!gate.verify_password(&secret("new-password")).unwrap());
    }

    #[test]
    fn test_half_written_credential_is_refused() {
        let store = MemorySettingsStore::new();
        store
            .insert_raw(PASSWORD_HASH_KEY, &codec::encode(&[0u8; DIGEST_LENGTH]))
            .unwrap();
        let gate = PasswordGate::new(store);

        let result = gate.verify_password(&secret("anything"));
        assert!(matches!(result, Err(CipherpadError::IncompleteCredential(_))));
        assert!(gate.has_password().is_err());
    }

    #[test]
    fn test_malformed_salt_is_refused() {
        let store = MemorySettingsStore::new();
        store
            .insert_raw(PASSWORD_HASH_KEY, &codec::encode(&[0u8; DIGEST_LENGTH]))
            .unwrap();
        store.insert_raw(PASSWORD_SALT_KEY, "not base64!").unwrap();
        let gate = PasswordGate::new(store);

        let result = gate.verify_password(&secret("anything"));
        assert!(matches!(result, Err(CipherpadError::IncompleteCredential(_))));
    }

    #[test]
    fn test_empty_password_rejected() {
        let gate = PasswordGate::new(MemorySettingsStore::new());
        let result = gate.set_password(&secret("   "));
        assert!(matches!(result, Err(CipherpadError::InvalidInput(_))));
        assert!(!gate.has_password().unwrap());
    }

    #[test]
    fn test_change_password_requires_current() {
        let gate = PasswordGate::new(MemorySettingsStore::new());
        gate.set_password(&secret("first")).unwrap();

        let result = gate.change_password(&secret("nope"), &secret("second"));
        assert!(matches!(result, Err(CipherpadError::IncorrectPassword)));
        assert!(gate.verify_password(&secret("first")).unwrap());

        gate.change_password(&secret("first"), &secret("second")).unwrap();
        assert!(gate.verify_password(&secret("second")).unwrap());
        assert!(!gate.verify_password(&secret("first")).unwrap());
    }

    #[test]
    fn test_concurrent_set_password_leaves_consistent_pair() {
        use std::sync::Arc;

        let gate = Arc::new(PasswordGate::new(MemorySettingsStore::new()));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let gate = Arc::clone(&gate);
                std::thread::spawn(move || {
                    gate.set_password(&secret(&format!("password-{}", i)))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let matching = (0..8)
            .filter(|i| {
                gate.verify_password(&secret(&format!("password-{}", i)))
                    .unwrap()
            })
            .count();
        assert_eq!(matching, 1);
    }

    #[test]
    fn test_concurrent_changes_from_same_password_have_one_winner() {
        use std::sync::Arc;

        let gate = Arc::new(PasswordGate::new(MemorySettingsStore::new()));
        gate.set_password(&secret("shared-old")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let gate = Arc::clone(&gate);
                std::thread::spawn(move || {
                    gate.change_password(&secret("shared-old"), &secret(&format!("new-{}", i)))
                })
            })
            .collect();
        let results: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(CipherpadError::IncorrectPassword))));
        assert!(!gate.verify_password(&secret("shared-old")).unwrap());
    }
}
