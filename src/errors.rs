use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in BlobVault.
#[derive(Debug, Error)]
pub enum BlobVaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong password or corrupted vault")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Unsupported cipher '{0}' (supported: AES256, CHACHA20)")]
    UnsupportedCipher(String),

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    // --- Vault errors ---
    #[error("Entry '{0}' not found or empty")]
    EntryNotFound(String),

    #[error("Vault at {} may be left unencrypted: {reason}", path.display())]
    VaultLeftInsecure { path: PathBuf, reason: String },

    // --- Item errors ---
    #[error("Invalid item '{0}' — expected key=value")]
    InvalidItem(String),

    #[error("Could not decode stored value: {0}")]
    Decode(String),

    #[error("Could not read file '{}': {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl BlobVaultError {
    /// Returns `true` for failures raised by the vault cipher: wrong
    /// password, corrupt ciphertext, or an unknown cipher name.
    pub fn is_crypto_error(&self) -> bool {
        matches!(
            self,
            Self::EncryptionFailed(_)
                | Self::DecryptionFailed
                | Self::KeyDerivationFailed(_)
                | Self::UnsupportedCipher(_)
                | Self::InvalidVaultFormat(_)
        )
    }
}

/// Convenience type alias for BlobVault results.
pub type Result<T> = std::result::Result<T, BlobVaultError>;
