//! Plaintext key-value store backing a vault.
//!
//! The decrypted vault is a JSON object mapping entry names to strings.
//! A `BTreeMap` keeps keys sorted, so rewriting an unchanged vault
//! produces identical bytes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::errors::{BlobVaultError, Result};

/// Mapping from entry name to its stored text value.
pub type VaultContents = BTreeMap<String, String>;

/// Load the plaintext mapping from `path`.
///
/// A missing or empty file yields an empty mapping.
pub fn load(path: &Path) -> Result<VaultContents> {
    if !path.exists() {
        return Ok(VaultContents::new());
    }

    let data = fs::read(path)?;
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(VaultContents::new());
    }

    serde_json::from_slice(&data).map_err(|e| {
        BlobVaultError::SerializationError(format!(
            "{} is not a key-value mapping of strings: {e}",
            path.display()
        ))
    })
}

/// Merge `incoming` into `existing`.
///
/// Incoming keys replace existing keys of the same name; every other
/// existing key is retained.
pub fn merge(mut existing: VaultContents, incoming: VaultContents) -> VaultContents {
    existing.extend(incoming);
    existing
}

/// Serialize `contents` as pretty JSON and write it to `path` atomically.
pub fn write(contents: &VaultContents, path: &Path) -> Result<()> {
    let mut json = serde_json::to_vec_pretty(contents)
        .map_err(|e| BlobVaultError::SerializationError(format!("vault contents: {e}")))?;
    json.push(b'\n');
    write_atomic(path, &json)
}

/// Write `bytes` to `path` through a temp file in the same directory.
///
/// The rename ensures readers never see a half-written vault.  On Unix
/// the temp file is created owner-only before any bytes land in it.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let result = write_private(&tmp_path, bytes).and_then(|()| fs::rename(&tmp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result.map_err(BlobVaultError::from)
}

#[cfg(unix)]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    fs::write(path, bytes)
}
