//! Authenticated encryption of the vault payload.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext.  `decrypt` splits the nonce back out
//! before decrypting.  Both supported ciphers share the same layout:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::Aes256Gcm;
use chacha20poly1305::ChaCha20Poly1305;

use super::cipher::CipherKind;
use crate::errors::{BlobVaultError, Result};

/// Size of the nonce in bytes (same for AES-GCM and ChaCha20-Poly1305).
pub const NONCE_LEN: usize = 12;

/// Encrypt `plaintext` with a 32-byte `key` using the given cipher.
///
/// Returns the nonce prepended to the ciphertext (nonce || ciphertext).
pub fn encrypt(kind: CipherKind, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    match kind {
        CipherKind::Aes256 => seal::<Aes256Gcm>(key, plaintext),
        CipherKind::ChaCha20 => seal::<ChaCha20Poly1305>(key, plaintext),
    }
}

/// Decrypt data that was produced by `encrypt` with the same cipher.
pub fn decrypt(kind: CipherKind, key: &[u8], ciphertext_with_nonce: &[u8]) -> Result<Vec<u8>> {
    match kind {
        CipherKind::Aes256 => open::<Aes256Gcm>(key, ciphertext_with_nonce),
        CipherKind::ChaCha20 => open::<ChaCha20Poly1305>(key, ciphertext_with_nonce),
    }
}

fn seal<C>(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>
where
    C: Aead + AeadCore + KeyInit,
{
    let cipher = C::new_from_slice(key)
        .map_err(|e| BlobVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = C::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| BlobVaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    // Prepend the nonce so the caller only needs to store one blob.
    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

fn open<C>(key: &[u8], ciphertext_with_nonce: &[u8]) -> Result<Vec<u8>>
where
    C: Aead + AeadCore + KeyInit,
{
    if ciphertext_with_nonce.len() < NONCE_LEN {
        return Err(BlobVaultError::DecryptionFailed);
    }

    let (nonce_bytes, ciphertext) = ciphertext_with_nonce.split_at(NONCE_LEN);
    let nonce = aes_gcm::aead::Nonce::<C>::from_slice(nonce_bytes);

    let cipher = C::new_from_slice(key).map_err(|_| BlobVaultError::DecryptionFailed)?;

    // Decrypt and verify the auth tag.
    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| BlobVaultError::DecryptionFailed)
}
