use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{CachetteError, Result};

/// Store-level configuration, loaded from `.cachette.toml`.
///
/// Every field has a sensible default so Cachette works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Explicit store root directory.  When unset, the root is resolved
    /// to `$HOME/.cachette`.
    #[serde(default)]
    pub root_dir: Option<PathBuf>,

    /// How many archive entries to keep per database (default: 7).
    #[serde(default = "default_archive_keep")]
    pub archive_keep: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_archive_keep() -> usize {
    7
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_dir: None,
            archive_keep: default_archive_keep(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for.
    const FILE_NAME: &'static str = ".cachette.toml";

    /// Directory name used under `$HOME` when no root override is set.
    const DEFAULT_ROOT_NAME: &'static str = ".cachette";

    /// Load settings from `<dir>/.cachette.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            CachetteError::ConfigError(format!("Failed to read {}: {e}", config_path.display()))
        })?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            CachetteError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Convenience constructor for an explicit root override.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: Some(root.into()),
            ..Self::default()
        }
    }

    /// The store root directory: the configured override, or
    /// `$HOME/.cachette`.
    ///
    /// Fails with `StorageUnavailable` when no override is configured and
    /// the environment has no home directory to fall back to.
    pub fn resolve_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.root_dir {
            return Ok(root.clone());
        }

        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(Self::DEFAULT_ROOT_NAME))
            .ok_or_else(|| {
                CachetteError::StorageUnavailable(
                    "HOME is not set and no root_dir is configured".into(),
                )
            })
    }
}

// ── Tests ────────────────────────────────────────────────────────────
