use thiserror::Error;

/// All errors that can occur in Cachette.
#[derive(Debug, Error)]
pub enum CachetteError {
    // --- Crypto errors ---
    #[error("Password must not be empty")]
    InvalidPassword,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — the active key is not the key that sealed this value")]
    KeyMismatch,

    // --- Vault errors ---
    #[error("Secret '{0}' not found")]
    NotFound(String),

    #[error("Corrupt payload: {0}")]
    CorruptPayload(String),

    // --- Storage errors ---
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error(
        "Invalid database name '{0}' — only ASCII letters, digits, underscores, and hyphens are allowed"
    )]
    InvalidDatabaseName(String),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),
}

/// Convenience type alias for Cachette results.
pub type Result<T> = std::result::Result<T, CachetteError>;
