//! Cryptographic primitives for Cachette.
//!
//! This module provides:
//! - Password-to-key derivation via the legacy tiling scheme (`kdf`)
//! - AES-256-GCM sealing/unsealing of secret values (`cipher`)

pub mod cipher;
pub mod kdf;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{derive_key, seal, unseal, MasterKey};
pub use cipher::{seal, unseal};
pub use kdf::{derive_key, derive_key_material, MasterKey};
