//! In-place encryption and decryption of vault files.
//!
//! The workflow only talks to the `VaultCipher` trait, so tests can swap
//! in a cipher that fails on demand.

use std::fs;
use std::path::Path;

use zeroize::Zeroizing;

use super::format;
use super::store::write_atomic;
use crate::crypto::{Argon2Params, CipherKind};
use crate::errors::Result;

/// Replaces a vault file's contents with its encrypted or plaintext form.
pub trait VaultCipher {
    /// Encrypt the plaintext file at `path` in place.
    fn encrypt(&self, path: &Path, cipher_name: &str, password: &[u8]) -> Result<()>;

    /// Decrypt the encrypted file at `path` in place.
    ///
    /// Fails with a crypto error on a wrong password or corrupt input,
    /// leaving the file untouched.
    fn decrypt(&self, path: &Path, cipher_name: &str, password: &[u8]) -> Result<()>;
}

/// Password-based cipher: Argon2id key derivation plus an AEAD.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCipher {
    argon2_params: Argon2Params,
}

impl FileCipher {
    /// Seal new envelopes with the given Argon2 parameters.
    pub fn new(argon2_params: Argon2Params) -> Self {
        Self { argon2_params }
    }
}

impl VaultCipher for FileCipher {
    fn encrypt(&self, path: &Path, cipher_name: &str, password: &[u8]) -> Result<()> {
        let kind: CipherKind = cipher_name.parse()?;
        let plaintext = Zeroizing::new(fs::read(path)?);
        let sealed = format::seal(&plaintext, kind, password, &self.argon2_params)?;
        write_atomic(path, &sealed)
    }

    fn decrypt(&self, path: &Path, _cipher_name: &str, password: &[u8]) -> Result<()> {
        // The header names the cipher the file was sealed with.
        let data = fs::read(path)?;
        let (plaintext, _kind) = format::open(&data, password)?;
        write_atomic(path, &plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BlobVaultError;
    use tempfile::TempDir;

    fn cipher() -> FileCipher {
        FileCipher::new(Argon2Params {
            memory_kib: 8_192,
            iterations: 1,
            parallelism: 1,
        })
    }

    #[test]
    fn encrypt_then_decrypt_restores_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v");
        fs::write(&path, "{\"a\": \"1\"}\n").unwrap();

        cipher().encrypt(&path, "AES256", b"pw").unwrap();
        assert!(format::is_encrypted(&path).unwrap());

        cipher().decrypt(&path, "AES256", b"pw").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\": \"1\"}\n");
    }

    #[test]
    fn wrong_password_leaves_file_encrypted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v");
        fs::write(&path, "{}").unwrap();
        cipher().encrypt(&path, "CHACHA20", b"right").unwrap();
        let before = fs::read(&path).unwrap();

        let err = cipher().decrypt(&path, "CHACHA20", b"wrong").unwrap_err();
        assert!(err.is_crypto_error());
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn unknown_cipher_does_not_touch_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v");
        fs::write(&path, "{}").unwrap();

        let err = cipher().encrypt(&path, "ROT13", b"pw").unwrap_err();
        assert!(matches!(err, BlobVaultError::UnsupportedCipher(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }
}
