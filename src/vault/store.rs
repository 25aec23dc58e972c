//! The runtime vault: a payload combined with the active master key.
//!
//! `SecretVault` is never serialized — persistence goes through
//! `payload()` / `into_payload()`, which hand the storage layer the
//! ciphertext map and nothing else.  A loaded payload is useless on its
//! own: it has to be combined with a freshly derived key via `unlock`
//! before any value can be read.

use zeroize::Zeroize;

use crate::crypto::cipher::{seal, unseal};
use crate::crypto::kdf::MasterKey;
use crate::errors::{CachetteError, Result};

use super::payload::VaultPayload;

/// An encrypted name → value mapping bound to the key derived from the
/// session password.
pub struct SecretVault {
    /// The persisted ciphertext map.
    payload: VaultPayload,

    /// The active key (zeroized on drop).  Replaced by `set_key`; never
    /// part of the payload.
    key: MasterKey,
}

impl SecretVault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a fresh empty vault keyed by `password`.
    pub fn create(password: &str) -> Result<Self> {
        Self::unlock(VaultPayload::new(), password)
    }

    /// Combine a loaded payload with the key derived from `password`.
    ///
    /// This does not verify the password — entries sealed under a
    /// different key simply fail with `KeyMismatch` on `get`.  Use
    /// `key_matches` to check up front.
    pub fn unlock(payload: VaultPayload, password: &str) -> Result<Self> {
        Ok(Self {
            payload,
            key: MasterKey::from_password(password)?,
        })
    }

    // ------------------------------------------------------------------
    // Secret operations
    // ------------------------------------------------------------------

    /// Re-derive the active key from `password`, replacing the old one.
    ///
    /// Existing ciphertext entries are untouched: values sealed under a
    /// previous key stay unreadable until that key is restored.
    pub fn set_key(&mut self, password: &str) -> Result<()> {
        self.key = MasterKey::from_password(password)?;
        Ok(())
    }

    /// Seal `plaintext` under the active key and store it at `name`,
    /// overwriting any previous value.
    pub fn put(&mut self, name: &str, plaintext: &str) -> Result<()> {
        let sealed = seal(&self.key, plaintext.as_bytes())?;
        self.payload.insert(name.to_string(), sealed);
        Ok(())
    }

    /// Unseal and return the value stored at `name`.
    ///
    /// Fails with `NotFound` if the name is absent, `KeyMismatch` if the
    /// active key is not the one that sealed the value, and
    /// `CorruptPayload` if the stored bytes are structurally invalid.
    pub fn get(&self, name: &str) -> Result<String> {
        let sealed = self
            .payload
            .get(name)
            .ok_or_else(|| CachetteError::NotFound(name.to_string()))?;

        let plaintext = unseal(&self.key, sealed)?;

        // Convert to String via from_utf8 which takes ownership (no clone).
        // On error, zeroize the bytes inside the error before discarding.
        String::from_utf8(plaintext).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            CachetteError::CorruptPayload("secret value is not valid UTF-8".to_string())
        })
    }

    /// All stored names, sorted, regardless of whether they unseal under
    /// the current key.
    pub fn list_names(&self) -> Vec<String> {
        self.payload.names()
    }

    /// Returns `true` if the vault contains a secret with the given name.
    ///
    /// Metadata-only check — no decryption is performed.
    pub fn contains(&self, name: &str) -> bool {
        self.payload.contains(name)
    }

    /// Number of stored secrets.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Returns `true` if no secrets are stored.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Whether the active key is the one that sealed the stored entries.
    ///
    /// Trial-unseals the first entry: success means the password that
    /// produced the active key is the one that wrote this vault, a tag
    /// failure means it is not.  An empty vault has no ciphertext to
    /// contradict the key, so it reports `true`.  Structural corruption
    /// propagates as an error rather than a verdict.
    pub fn key_matches(&self) -> Result<bool> {
        let Some((_, sealed)) = self.payload.first_entry() else {
            return Ok(true);
        };

        match unseal(&self.key, sealed) {
            Ok(mut plaintext) => {
                plaintext.zeroize();
                Ok(true)
            }
            Err(CachetteError::KeyMismatch) => Ok(false),
            Err(e) => Err(e),
        }
    }

    // ------------------------------------------------------------------
    // Persistence boundary
    // ------------------------------------------------------------------

    /// The persisted form of this vault (ciphertext map only).
    pub fn payload(&self) -> &VaultPayload {
        &self.payload
    }

    /// Consume the vault, keeping only its persisted form.  The active
    /// key is dropped (and zeroized) here.
    pub fn into_payload(self) -> VaultPayload {
        self.payload
    }
}
