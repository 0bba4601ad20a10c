//! Cipher key derivation using HKDF-SHA256.
//!
//! The Argon2id output is expanded with a context string naming the
//! cipher, so a payload can only be opened with the algorithm written in
//! its header.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use super::cipher::CipherKind;
use super::kdf::KEY_LEN;
use crate::errors::{BlobVaultError, Result};

/// A 32-byte key that zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct VaultKey {
    bytes: [u8; KEY_LEN],
}

impl VaultKey {
    /// Derive the key for `kind` from the Argon2id master key.
    ///
    /// `info` is `"blobvault-cipher:<NAME>"`.
    pub fn derive(master_key: &[u8], kind: CipherKind) -> Result<Self> {
        let info = format!("blobvault-cipher:{}", kind.name());
        // `salt` is None: the master key already carries full entropy.
        let hk = Hkdf::<Sha256>::new(None, master_key);

        let mut bytes = [0u8; KEY_LEN];
        hk.expand(info.as_bytes(), &mut bytes)
            .map_err(|e| BlobVaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

        Ok(Self { bytes })
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}
