//! Storage module — durable persistence for a named database.
//!
//! This module provides:
//! - The versioned on-disk envelope around the payload JSON (`format`)
//! - `StorageManager`: path layout, save/load, archival, and the
//!   retention sweep (`manager`)
//!
//! The storage layer treats the vault payload as an opaque serializable
//! blob; it never interprets ciphertext.

pub mod format;
pub mod manager;

// Re-export the most commonly used items.
pub use manager::StorageManager;

use std::path::Path;

use crate::errors::CachetteError;

/// Wrap an I/O failure with the path it occurred at.
///
/// Environmental failures (permissions, disk full, vanished directories)
/// all surface as `StorageUnavailable`, keeping them distinct from
/// `CorruptPayload` (bytes present but unparseable) and from "no prior
/// state" (not an error at all).
pub(crate) fn io_unavailable(path: &Path, err: std::io::Error) -> CachetteError {
    CachetteError::StorageUnavailable(format!("{}: {err}", path.display()))
}
