//! Parsing of `key=value` command arguments.
//!
//! Used by `add` (values may name files to embed) and by `extract`
//! (values name the files to write).

use std::fs;
use std::path::{Path, PathBuf};

use super::store::VaultContents;
use crate::codec;
use crate::errors::{BlobVaultError, Result};

/// A per-item failure: the raw argument and why it was skipped.
#[derive(Debug)]
pub struct ItemFailure {
    pub item: String,
    pub error: BlobVaultError,
}

/// The outcome of parsing a batch of `add` items.
#[derive(Debug, Default)]
pub struct ParsedItems {
    /// Entries ready to merge into the vault.
    pub entries: VaultContents,
    /// Items that could not be parsed or read.
    pub failures: Vec<ItemFailure>,
}

/// One `key=targetPath` extraction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractTarget {
    pub key: String,
    pub path: PathBuf,
}

/// Split `key=value` on the first `=` only.
///
/// Values may contain further `=` characters (base64 padding, URLs).
pub fn split_item(item: &str) -> Result<(&str, &str)> {
    match item.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => Err(BlobVaultError::InvalidItem(item.to_string())),
    }
}

/// Parse `add` items into vault entries.
///
/// A value naming an existing file is replaced by the base64 encoding
/// of the file's bytes; any other value is stored as-is.  A bad item is
/// recorded in `failures` and the rest of the batch continues.
pub fn parse_items<S: AsRef<str>>(raw_items: &[S]) -> ParsedItems {
    let mut parsed = ParsedItems::default();

    for raw in raw_items {
        let raw = raw.as_ref();
        match resolve_item(raw) {
            Ok((key, value)) => {
                parsed.entries.insert(key, value);
            }
            Err(error) => parsed.failures.push(ItemFailure {
                item: raw.to_string(),
                error,
            }),
        }
    }

    parsed
}

/// Parse `extract` items into targets.
pub fn parse_targets<S: AsRef<str>>(raw_items: &[S]) -> (Vec<ExtractTarget>, Vec<ItemFailure>) {
    let mut targets = Vec::with_capacity(raw_items.len());
    let mut failures = Vec::new();

    for raw in raw_items {
        let raw = raw.as_ref();
        match split_item(raw) {
            Ok((key, path)) if !path.is_empty() => targets.push(ExtractTarget {
                key: key.to_string(),
                path: PathBuf::from(path),
            }),
            Ok(_) => failures.push(ItemFailure {
                item: raw.to_string(),
                error: BlobVaultError::InvalidItem(raw.to_string()),
            }),
            Err(error) => failures.push(ItemFailure {
                item: raw.to_string(),
                error,
            }),
        }
    }

    (targets, failures)
}

fn resolve_item(raw: &str) -> Result<(String, String)> {
    let (key, value) = split_item(raw)?;

    let candidate = Path::new(value);
    if !value.is_empty() && candidate.is_file() {
        let bytes = fs::read(candidate).map_err(|source| BlobVaultError::FileRead {
            path: candidate.to_path_buf(),
            source,
        })?;
        return Ok((key.to_string(), codec::encode(&bytes)));
    }

    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn splits_on_first_equals_only() {
        assert_eq!(split_item("token=a=b==").unwrap(), ("token", "a=b=="));
    }

    #[test]
    fn empty_value_is_allowed() {
        assert_eq!(split_item("k=").unwrap(), ("k", ""));
    }

    #[test]
    fn rejects_missing_equals_and_empty_key() {
        assert!(matches!(
            split_item("novalue").unwrap_err(),
            BlobVaultError::InvalidItem(_)
        ));
        assert!(split_item("=value").is_err());
    }

    #[test]
    fn literal_values_are_kept() {
        let parsed = parse_items(&["a=hello", "url=https://x.test/?q=1"]);
        assert!(parsed.failures.is_empty());
        assert_eq!(parsed.entries["a"], "hello");
        assert_eq!(parsed.entries["url"], "https://x.test/?q=1");
    }

    #[test]
    fn file_values_are_encoded() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("key.bin");
        fs::write(&file, [0x01, 0x02, 0x03]).unwrap();

        let item = format!("b={}", file.display());
        let parsed = parse_items(&[item]);
        assert_eq!(parsed.entries["b"], "AQID");
    }

    #[test]
    fn directories_are_treated_as_literals() {
        let dir = TempDir::new().unwrap();
        let item = format!("d={}", dir.path().display());
        let parsed = parse_items(&[item.clone()]);
        assert_eq!(parsed.entries["d"], item[2..]);
    }

    #[test]
    fn bad_item_does_not_abort_batch() {
        let parsed = parse_items(&["broken", "ok=1"]);
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.failures.len(), 1);
        assert_eq!(parsed.failures[0].item, "broken");
    }

    #[test]
    fn later_items_win_within_batch() {
        let parsed = parse_items(&["k=first", "k=second"]);
        assert_eq!(parsed.entries["k"], "second");
    }

    #[test]
    fn targets_require_a_path() {
        let (targets, failures) = parse_targets(&["cert=/tmp/out.pem", "key=", "junk"]);
        assert_eq!(
            targets,
            vec![ExtractTarget {
                key: "cert".into(),
                path: PathBuf::from("/tmp/out.pem"),
            }]
        );
        assert_eq!(failures.len(), 2);
    }
}
