//! Cryptographic primitives for BlobVault.
//!
//! This module provides:
//! - AES-256-GCM and ChaCha20-Poly1305 encryption (`encryption`)
//! - Cipher names as written in vault headers (`cipher`)
//! - Argon2id password-based key derivation (`kdf`)
//! - HKDF-based per-cipher key derivation (`keys`)

pub mod cipher;
pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use cipher::{CipherKind, DEFAULT_CIPHER};
pub use encryption::{decrypt, encrypt};
pub use kdf::{derive_key, generate_salt, Argon2Params};
pub use keys::VaultKey;
