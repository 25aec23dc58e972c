//! Vault module — the encrypted name → ciphertext mapping.
//!
//! This module provides:
//! - `VaultPayload`, the persisted form: the ciphertext map and nothing
//!   else (`payload`)
//! - `SecretVault`, the runtime form: a payload combined with the active
//!   master key (`store`)

pub mod payload;
pub mod store;

// Re-export the most commonly used items.
pub use payload::VaultPayload;
pub use store::SecretVault;
