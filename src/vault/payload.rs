//! The persisted form of a vault: a map of secret name → sealed value.
//!
//! `VaultPayload` is the only vault type that ever touches disk, and it
//! structurally cannot contain key material — there is no key field to
//! strip at serialization time.  Sealed values serialize as base64
//! strings in JSON rather than raw byte arrays.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The ciphertext map persisted in the primary file and every archive
/// entry.  Names are unique; `BTreeMap` keeps both listing and the JSON
/// output deterministically ordered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultPayload {
    entries: BTreeMap<String, SealedValue>,
}

/// A single sealed value (nonce + ciphertext + tag) as produced by
/// `crypto::seal`.  Base64 in JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedValue(
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")] Vec<u8>,
);

impl VaultPayload {
    /// An empty payload, for a database with no prior state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored secrets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no secrets are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All stored names, sorted.  Listing never touches ciphertext, so it
    /// works regardless of which key sealed the values.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Returns `true` if a secret with the given name is stored.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(|v| v.0.as_slice())
    }

    pub(crate) fn insert(&mut self, name: String, sealed: Vec<u8>) {
        self.entries.insert(name, SealedValue(sealed));
    }

    /// The first entry in name order, used for trial decryption when
    /// checking whether the active key matches the stored ciphertext.
    pub(crate) fn first_entry(&self) -> Option<(&str, &[u8])> {
        self.entries
            .iter()
            .next()
            .map(|(name, v)| (name.as_str(), v.0.as_slice()))
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
