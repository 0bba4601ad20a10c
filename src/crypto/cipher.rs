//! Named symmetric ciphers a vault can be sealed with.

use std::fmt;
use std::str::FromStr;

use crate::errors::BlobVaultError;

/// Cipher used when none is configured.
pub const DEFAULT_CIPHER: &str = "AES256";

/// The AEAD algorithm named in a vault header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherKind {
    /// AES-256-GCM.
    Aes256,
    /// ChaCha20-Poly1305.
    ChaCha20,
}

impl CipherKind {
    /// The canonical name written to the vault header.
    pub fn name(self) -> &'static str {
        match self {
            Self::Aes256 => "AES256",
            Self::ChaCha20 => "CHACHA20",
        }
    }
}

impl FromStr for CipherKind {
    type Err = BlobVaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AES256" | "AES-256-GCM" => Ok(Self::Aes256),
            "CHACHA20" | "CHACHA20-POLY1305" => Ok(Self::ChaCha20),
            _ => Err(BlobVaultError::UnsupportedCipher(s.to_string())),
        }
    }
}

impl fmt::Display for CipherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
