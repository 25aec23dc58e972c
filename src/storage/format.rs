//! On-disk envelope for a serialized vault payload.
//!
//! The primary file and every archive entry hold the same shape:
//!
//! ```text
//! [CVLT: 4 bytes][version: 1 byte][payload JSON]
//! ```
//!
//! - **Magic** (`CVLT`): identifies the file as a Cachette vault.
//! - **Version**: format version (currently `1`), so a future layout
//!   change fails loudly instead of silently misreading old archives.
//! - **Payload JSON**: serialized `VaultPayload` (name → base64
//!   ciphertext).
//!
//! Writes go through a temp file in the same directory followed by a
//! rename, so a reader never observes a half-written primary file and
//! the archive copy taken after `write_payload` returns is always a
//! complete version.

use std::fs;
use std::path::Path;

use crate::errors::{CachetteError, Result};
use crate::vault::VaultPayload;

use super::io_unavailable;

/// Magic bytes at the start of every vault file.
const MAGIC: &[u8; 4] = b"CVLT";

/// Current envelope format version.
pub const CURRENT_VERSION: u8 = 1;

/// Fixed-size prefix: 4 (magic) + 1 (version).
const PREFIX_LEN: usize = 5;

/// Serialize `payload` and write it to `path` atomically.
pub fn write_payload(path: &Path, payload: &VaultPayload) -> Result<()> {
    let body = serde_json::to_vec(payload)
        .map_err(|e| CachetteError::SerializationError(format!("payload: {e}")))?;

    let mut buf = Vec::with_capacity(PREFIX_LEN + body.len());
    buf.extend_from_slice(MAGIC); // 4 bytes
    buf.push(CURRENT_VERSION); // 1 byte
    buf.extend_from_slice(&body); // payload JSON

    // Atomic write: temp file, then rename.  The temp file is in the same
    // directory so the rename stays on one filesystem.
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, &buf).map_err(|e| io_unavailable(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| io_unavailable(path, e))?;

    Ok(())
}

/// Read and deserialize a vault payload from `path`.
///
/// Any structural problem — truncated prefix, foreign magic, unsupported
/// version, unparseable JSON — is `CorruptPayload`; the caller already
/// established that the file exists, so read failures are environmental.
pub fn read_payload(path: &Path) -> Result<VaultPayload> {
    let data = fs::read(path).map_err(|e| io_unavailable(path, e))?;

    if data.len() < PREFIX_LEN {
        return Err(CachetteError::CorruptPayload(
            "file too small to be a vault payload".into(),
        ));
    }

    if &data[0..4] != MAGIC {
        return Err(CachetteError::CorruptPayload(
            "missing CVLT magic bytes".into(),
        ));
    }

    let version = data[4];
    if version != CURRENT_VERSION {
        return Err(CachetteError::CorruptPayload(format!(
            "unsupported format version {version}, expected {CURRENT_VERSION}"
        )));
    }

    serde_json::from_slice(&data[PREFIX_LEN..])
        .map_err(|e| CachetteError::CorruptPayload(format!("payload JSON: {e}")))
}
