//! Password-to-key derivation: the legacy tiling scheme.
//!
//! A password is stretched (or cut) to exactly 32 characters: passwords of
//! 32 characters or more are truncated, shorter ones repeat until the
//! length is reached.  The scheme is deterministic and salt-free, which is
//! what lets the key be recomputed from the password alone each session —
//! nothing key-related is ever persisted.
//!
//! Known weakness, preserved as an interoperability contract: short
//! passwords produce highly repetitive key material.  Do not reuse this
//! derivation outside this store.

use zeroize::Zeroize;

use crate::errors::{CachetteError, Result};

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Stretch or cut a password to exactly 32 characters.
///
/// For a password of length `L >= 32` this is the first 32 characters.
/// For `L < 32` it is the password repeated `32 / L` times followed by its
/// first `32 % L` characters — equivalently, the character stream cycled
/// and cut at 32.
pub fn derive_key_material(password: &str) -> Result<String> {
    if password.is_empty() {
        return Err(CachetteError::InvalidPassword);
    }

    Ok(password.chars().cycle().take(KEY_LEN).collect())
}

/// Derive a 32-byte master key from a password.
///
/// The 32-character key material is encoded as UTF-8 and must come out at
/// exactly 32 bytes, so multi-byte (non-ASCII) passwords are rejected here
/// rather than producing an over-long key the cipher would refuse anyway.
pub fn derive_key(password: &str) -> Result<MasterKey> {
    let mut material = derive_key_material(password)?.into_bytes();

    if material.len() != KEY_LEN {
        material.zeroize();
        return Err(CachetteError::KeyDerivationFailed(format!(
            "key material must be exactly {KEY_LEN} bytes — non-ASCII passwords are not supported"
        )));
    }

    let mut bytes = [0u8; KEY_LEN];
    bytes.copy_from_slice(&material);
    material.zeroize();

    Ok(MasterKey::new(bytes))
}

/// A wrapper around a 32-byte master key that automatically zeroes
/// its memory when dropped.
///
/// Use this to hold the active key in memory so it cannot linger
/// after it is no longer needed.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a new `MasterKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Derive a `MasterKey` directly from a password.
    pub fn from_password(password: &str) -> Result<Self> {
        derive_key(password)
    }

    /// Access the raw key bytes (e.g. to pass to the cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}
