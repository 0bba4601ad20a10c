//! Encrypted vault file format and state detection.
//!
//! An encrypted vault is a text file:
//!
//! ```text
//! $BLOBVAULT;1.0;AES256
//! <base64 payload, wrapped at 76 columns>
//! ```
//!
//! The payload is binary:
//!
//! ```text
//! [salt: 32 bytes][m_kib: u32 LE][t: u32 LE][p: u32 LE][nonce: 12 bytes][ciphertext + tag]
//! ```
//!
//! - **Sentinel** (`$BLOBVAULT`): identifies an encrypted vault; anything
//!   else on the first line means the file is plaintext.
//! - **Cipher**: the algorithm the payload was sealed with.  Opening uses
//!   this name, not the one the caller asked for.
//! - **Argon2 params**: stored so the vault always opens with the exact
//!   settings it was sealed with.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use zeroize::{Zeroize, Zeroizing};

use crate::codec;
use crate::crypto::kdf::SALT_LEN;
use crate::crypto::{self, Argon2Params, CipherKind, VaultKey};
use crate::errors::{BlobVaultError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Leading marker of every encrypted vault file.
pub const SENTINEL: &str = "$BLOBVAULT";

/// Current envelope format version.
pub const FORMAT_VERSION: &str = "1.0";

/// Column width of the base64 body.
const LINE_WIDTH: usize = 76;

/// Fixed-size payload prefix: salt + three u32 Argon2 params.
const PARAMS_LEN: usize = SALT_LEN + 12;

// ---------------------------------------------------------------------------
// State detection
// ---------------------------------------------------------------------------

/// On-disk state of a vault file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    /// No file at the path.
    Absent,
    /// The file holds the readable key-value mapping.
    Plaintext,
    /// The file is a sealed envelope.
    Encrypted,
}

/// Returns `true` iff the first line of the file starts with the sentinel.
///
/// Only the first line is read, as raw bytes, so binary content never
/// causes a UTF-8 error.  Fails if the file cannot be opened.
pub fn is_encrypted(path: &Path) -> Result<bool> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut first_line = Vec::new();
    reader.read_until(b'\n', &mut first_line)?;
    Ok(first_line.starts_with(SENTINEL.as_bytes()))
}

/// Work out whether the vault at `path` is absent, plaintext or encrypted.
pub fn detect_state(path: &Path) -> Result<VaultState> {
    if !path.exists() {
        return Ok(VaultState::Absent);
    }
    if is_encrypted(path)? {
        Ok(VaultState::Encrypted)
    } else {
        Ok(VaultState::Plaintext)
    }
}

// ---------------------------------------------------------------------------
// Seal / open
// ---------------------------------------------------------------------------

/// Encrypt `plaintext` into the full text of an encrypted vault file.
pub fn seal(
    plaintext: &[u8],
    kind: CipherKind,
    password: &[u8],
    argon2_params: &Argon2Params,
) -> Result<Vec<u8>> {
    let salt = crypto::generate_salt();
    let key = derive_vault_key(password, &salt, argon2_params, kind)?;
    let sealed = crypto::encrypt(kind, key.as_bytes(), plaintext)?;

    let mut payload = Vec::with_capacity(PARAMS_LEN + sealed.len());
    payload.extend_from_slice(&salt);
    payload.extend_from_slice(&argon2_params.memory_kib.to_le_bytes());
    payload.extend_from_slice(&argon2_params.iterations.to_le_bytes());
    payload.extend_from_slice(&argon2_params.parallelism.to_le_bytes());
    payload.extend_from_slice(&sealed);

    let body = codec::encode(&payload);
    let mut out = format!("{SENTINEL};{FORMAT_VERSION};{}\n", kind.name());
    // base64 output is pure ASCII, so byte chunks are valid str slices.
    for line in body.as_bytes().chunks(LINE_WIDTH) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    Ok(out.into_bytes())
}

/// Decrypt the full text of an encrypted vault file.
///
/// Returns the plaintext together with the cipher named in the header.
pub fn open(data: &[u8], password: &[u8]) -> Result<(Zeroizing<Vec<u8>>, CipherKind)> {
    let text = std::str::from_utf8(data)
        .map_err(|_| BlobVaultError::InvalidVaultFormat("vault is not valid text".into()))?;

    let (header, body) = text.split_once('\n').unwrap_or((text, ""));
    let kind = parse_header(header.trim_end_matches('\r'))?;

    let payload = codec::decode(body)
        .map_err(|e| BlobVaultError::InvalidVaultFormat(format!("payload: {e}")))?;
    if payload.len() < PARAMS_LEN + crypto::encryption::NONCE_LEN {
        return Err(BlobVaultError::InvalidVaultFormat(
            "payload too small to be a valid vault".into(),
        ));
    }

    let (salt, rest) = payload.split_at(SALT_LEN);
    let (params_bytes, sealed) = rest.split_at(12);
    let argon2_params = Argon2Params {
        memory_kib: read_u32(&params_bytes[0..4])?,
        iterations: read_u32(&params_bytes[4..8])?,
        parallelism: read_u32(&params_bytes[8..12])?,
    };
    if !argon2_params.within_limits() {
        return Err(BlobVaultError::InvalidVaultFormat(format!(
            "Argon2 parameters out of range: {argon2_params:?}"
        )));
    }

    let key = derive_vault_key(password, salt, &argon2_params, kind)?;
    let plaintext = crypto::decrypt(kind, key.as_bytes(), sealed)?;
    Ok((Zeroizing::new(plaintext), kind))
}

/// Parse `$BLOBVAULT;<version>;<CIPHER>` into the cipher it names.
fn parse_header(header: &str) -> Result<CipherKind> {
    let mut parts = header.split(';');
    if parts.next() != Some(SENTINEL) {
        return Err(BlobVaultError::InvalidVaultFormat(format!(
            "missing {SENTINEL} header"
        )));
    }

    let version = parts.next().unwrap_or_default();
    if version != FORMAT_VERSION {
        return Err(BlobVaultError::InvalidVaultFormat(format!(
            "unsupported version '{version}', expected {FORMAT_VERSION}"
        )));
    }

    let cipher = parts
        .next()
        .ok_or_else(|| BlobVaultError::InvalidVaultFormat("header names no cipher".into()))?;
    cipher.parse()
}

fn read_u32(bytes: &[u8]) -> Result<u32> {
    let arr: [u8; 4] = bytes
        .try_into()
        .map_err(|_| BlobVaultError::InvalidVaultFormat("bad Argon2 parameters".into()))?;
    Ok(u32::from_le_bytes(arr))
}

fn derive_vault_key(
    password: &[u8],
    salt: &[u8],
    argon2_params: &Argon2Params,
    kind: CipherKind,
) -> Result<VaultKey> {
    let mut master = crypto::derive_key(password, salt, argon2_params)?;
    let key = VaultKey::derive(&master, kind);
    master.zeroize();
    key
}
