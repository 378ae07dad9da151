//! Authenticated session holding the note encryption key.
//!
//! A session is created once, after the password gate accepts the user, and
//! owns the only in-memory handle to the key. Every note operation borrows
//! that handle; nothing re-reads key material per note. Locking the session
//! drops the handle, and the key bytes are zeroized when the last clone of
//! the cipher goes away.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::crypto::{load_or_create_key, validate_password, KeyStore, NoteCipher, SymmetricKey};
use crate::error::{CipherpadError, Result};
use crate::gate::PasswordGate;
use crate::settings::SettingsStore;

/// An unlocked session.
#[derive(Debug)]
pub struct Session {
    key: Arc<SymmetricKey>,
}

impl Session {
    /// First-run setup: create the note key, then set the password.
    ///
    /// The key is stored before the credential, so a failed key store leaves
    /// no password behind and setup can simply be run again.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the password is empty or a password is already set
    /// - any key store or settings store error
    pub fn initialize<S: SettingsStore>(
        gate: &PasswordGate<S>,
        key_store: &dyn KeyStore,
        password: &SecretString,
    ) -> Result<Self> {
        validate_password(password.expose_secret())?;
        if gate.has_password()? {
            return Err(CipherpadError::InvalidInput(
                "A password is already set".to_string(),
            ));
        }
        let key = load_or_create_key(key_store)?;
        gate.set_password(password)?;
        tracing::debug!("installation initialized");
        Ok(Self::with_key(key))
    }

    /// Verify `candidate` and load the note key.
    ///
    /// The key store is only touched after the password verifies. A missing
    /// key is an error; unlocking never creates one.
    ///
    /// # Errors
    ///
    /// - `IncorrectPassword` if the password does not match
    /// - `NoCredentialSet` if no password has been configured
    /// - `NoteKeyMissing` if the key store holds no key
    /// - any key store error from loading the key
    pub fn unlock<S: SettingsStore>(
        gate: &PasswordGate<S>,
        key_store: &dyn KeyStore,
        candidate: &SecretString,
    ) -> Result<Self> {
        if !gate.verify_password(candidate)? {
            tracing::debug!("unlock rejected");
            return Err(CipherpadError::IncorrectPassword);
        }
        let key = key_store.load()?.ok_or_else(|| {
            tracing::warn!("password accepted but the note key is missing");
            CipherpadError::NoteKeyMissing
        })?;
        tracing::debug!("session unlocked");
        Ok(Self::with_key(key))
    }

    /// Build a session around an already-loaded key.
    pub fn with_key(key: SymmetricKey) -> Self {
        Self { key: Arc::new(key) }
    }

    /// Cipher bound to this session's key.
    pub fn cipher(&self) -> NoteCipher {
        NoteCipher::new(Arc::clone(&self.key))
    }

    /// Fingerprint of the session key.
    pub fn key_fingerprint(&self) -> String {
        self.key.fingerprint()
    }

    pub(crate) fn key(&self) -> &SymmetricKey {
        &self.key
    }

    /// Replace the session key wholesale.
    ///
    /// Ciphers handed out earlier keep the old key.
    pub(crate) fn replace_key(&mut self, key: SymmetricKey) {
        self.key = Arc::new(key);
    }

    /// End the session.
    pub fn lock(self) {
        drop(self);
        tracing::debug!("session locked");
    }
}
