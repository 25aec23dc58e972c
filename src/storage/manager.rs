//! Path layout, archival, retention, and recovery for one named database.
//!
//! Layout under the resolved root directory:
//!
//! ```text
//! <root>/
//!   _archives/
//!     <database_name>/
//!       secrets_<YYMMDD_HHMMSS_microseconds>.vault
//!   <database_name>/
//!     secrets.vault
//! ```
//!
//! The primary file is the single mutable "current" copy; every
//! successful save also drops an immutable timestamped copy into the
//! archive directory, and the retention sweep bounds how many of those
//! are kept.  If the primary file goes missing, `load` falls back to the
//! newest archive entry.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::Settings;
use crate::errors::{CachetteError, Result};
use crate::vault::VaultPayload;

use super::format;
use super::io_unavailable;

/// File stem of the primary file and every archive entry.
pub const SECRET_FILE_STEM: &str = "secrets";

/// Extension identifying this store's serialization format.
pub const SECRET_FILE_EXT: &str = "vault";

/// Directory under the root holding per-database archive directories.
const ARCHIVE_DIR_NAME: &str = "_archives";

/// Timestamp format for archive entry names.  Fixed-width with
/// microsecond resolution, so lexicographic filename order equals
/// chronological order.
const ARCHIVE_STAMP_FORMAT: &str = "%y%m%d_%H%M%S_%6f";

/// Owns the on-disk layout for one named database.
///
/// Construction validates the database name and creates all directories
/// idempotently; that directory creation is its only side effect.  One
/// instance is assumed to exclusively own the subtree for its database —
/// there is no cross-process locking.
pub struct StorageManager {
    database_dir: PathBuf,
    archive_dir: PathBuf,
    primary_path: PathBuf,
    archive_keep: usize,
}

impl StorageManager {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Construct a manager for `database` using configured settings
    /// (root override or `$HOME` fallback, configured keep-count).
    pub fn new(database: &str, settings: &Settings) -> Result<Self> {
        Self::with_root(database, settings.resolve_root()?, settings.archive_keep)
    }

    /// Construct a manager with an explicit root directory and
    /// keep-count.  This is the injectable form tests use with a temp
    /// directory.
    pub fn with_root(database: &str, root: impl Into<PathBuf>, archive_keep: usize) -> Result<Self> {
        validate_database_name(database)?;

        let root = root.into();
        let database_dir = root.join(database);
        let archive_dir = root.join(ARCHIVE_DIR_NAME).join(database);

        // create_dir_all is idempotent; failure here (permissions, disk
        // full, missing mount) is fatal to construction.
        for dir in [&database_dir, &archive_dir] {
            fs::create_dir_all(dir).map_err(|e| io_unavailable(dir, e))?;
        }

        let primary_path = database_dir.join(format!("{SECRET_FILE_STEM}.{SECRET_FILE_EXT}"));

        Ok(Self {
            database_dir,
            archive_dir,
            primary_path,
            archive_keep,
        })
    }

    // ------------------------------------------------------------------
    // Save / load
    // ------------------------------------------------------------------

    /// Persist `payload`: write the primary file, archive it, sweep.
    ///
    /// The archive copy is taken from the freshly written primary file —
    /// and only after that write completed — so every archive entry
    /// reflects the version being saved, never a half-written one.
    /// Exactly one new archive entry is created per successful save.
    pub fn save(&self, payload: &VaultPayload) -> Result<()> {
        format::write_payload(&self.primary_path, payload)?;
        self.archive_primary()?;
        self.vacuum()?;
        Ok(())
    }

    /// Load the most recent persisted payload, if any.
    ///
    /// Prefers the primary file; if it is missing, falls back to the
    /// newest archive entry.  `Ok(None)` means no prior state exists —
    /// the caller should construct a fresh empty vault.  A file that
    /// exists but does not parse is `CorruptPayload`, never `None`.
    pub fn load(&self) -> Result<Option<VaultPayload>> {
        if self.primary_path.exists() {
            return format::read_payload(&self.primary_path).map(Some);
        }

        match self.archive_entries()?.last() {
            Some(newest) => format::read_payload(newest).map(Some),
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // Archival
    // ------------------------------------------------------------------

    /// Copy the primary file into the archive directory under a fresh
    /// timestamped name.
    fn archive_primary(&self) -> Result<PathBuf> {
        let stamp = Local::now().format(ARCHIVE_STAMP_FORMAT);
        let entry = self
            .archive_dir
            .join(format!("{SECRET_FILE_STEM}_{stamp}.{SECRET_FILE_EXT}"));

        fs::copy(&self.primary_path, &entry).map_err(|e| io_unavailable(&entry, e))?;
        Ok(entry)
    }

    /// All archive entries for this database, oldest first.
    ///
    /// Sorted by filename; the fixed-width timestamp makes that
    /// chronological.  Files not matching the `secrets_*.vault` naming
    /// convention are ignored.
    pub fn archive_entries(&self) -> Result<Vec<PathBuf>> {
        let prefix = format!("{SECRET_FILE_STEM}_");
        let suffix = format!(".{SECRET_FILE_EXT}");

        let mut entries = Vec::new();
        let dir = fs::read_dir(&self.archive_dir).map_err(|e| io_unavailable(&self.archive_dir, e))?;
        for entry in dir {
            let entry = entry.map_err(|e| io_unavailable(&self.archive_dir, e))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(&prefix) && name.ends_with(&suffix) {
                entries.push(entry.path());
            }
        }

        entries.sort();
        Ok(entries)
    }

    /// Delete archive entries beyond the keep-count, oldest first.
    ///
    /// Runs after every save.  Sweeps all excess entries at once, so the
    /// count is back at or below the keep-count as soon as the sweep
    /// returns.  This is the only destructive operation in the store.
    fn vacuum(&self) -> Result<()> {
        let entries = self.archive_entries()?;
        if entries.len() <= self.archive_keep {
            return Ok(());
        }

        let excess = entries.len() - self.archive_keep;
        for old in &entries[..excess] {
            fs::remove_file(old).map_err(|e| io_unavailable(old, e))?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Path to the primary file (may not exist yet).
    pub fn primary_path(&self) -> &Path {
        &self.primary_path
    }

    /// Per-database directory holding the primary file.
    pub fn database_dir(&self) -> &Path {
        &self.database_dir
    }

    /// Per-database archive directory.
    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Configured retention keep-count.
    pub fn archive_keep(&self) -> usize {
        self.archive_keep
    }
}

/// Validate that a database name is safe to use as a directory name.
///
/// Allowed: ASCII letters, digits, underscores, hyphens.  Must be
/// non-empty and at most 64 characters.  This keeps a name from ever
/// escaping the root directory.
fn validate_database_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 64 {
        return Err(CachetteError::InvalidDatabaseName(name.to_string()));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        return Err(CachetteError::InvalidDatabaseName(name.to_string()));
    }
    Ok(())
}
