//! AES-256-GCM sealing of individual secret values.
//!
//! Each call to `seal` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext.  `unseal` splits the nonce back out
//! before decrypting.
//!
//! Layout of a sealed value:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]
//!
//! The auth tag is what distinguishes "wrong key" from success: a value
//! sealed under key A will fail tag verification under any other key, so
//! `unseal` reports `KeyMismatch` instead of returning garbage.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use crate::crypto::kdf::MasterKey;
use crate::errors::{CachetteError, Result};

/// Size of the AES-256-GCM nonce in bytes.
const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under the given master key.
///
/// Returns the nonce prepended to the ciphertext (nonce || ciphertext),
/// so the caller only needs to store one blob per secret.
pub fn seal(key: &MasterKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CachetteError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| CachetteError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt a value that was produced by `seal`.
///
/// A value shorter than nonce + tag was never produced by `seal`, so that
/// is reported as corruption.  A failed tag check under a well-formed
/// value is reported as `KeyMismatch` — the caller decides whether that
/// means "wrong password" or "tampered bytes".
pub fn unseal(key: &MasterKey, sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(CachetteError::CorruptPayload(
            "sealed value shorter than nonce + tag".into(),
        ));
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CachetteError::EncryptionFailed(format!("invalid key length: {e}")))?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CachetteError::KeyMismatch)
}
