//! The `add` and `extract` operations.
//!
//! Both operations decrypt the vault file in place, work on the
//! plaintext, and seal it again.  The plaintext window is owned by an
//! `UnsealedVault` guard: every exit path (success, error, unwinding
//! panic) goes through it, so a vault that was encrypted when the
//! operation started is encrypted when it ends.  If sealing itself
//! fails, the guard puts back the exact bytes that were on disk before
//! the operation, or removes a vault this operation created.
//!
//! `extract` never changes the vault, so it puts the original ciphertext
//! back rather than sealing again: the cipher, salt and Argon2 params on
//! disk stay exactly as they were.

use std::fs;
use std::path::Path;

use zeroize::Zeroizing;

use super::adapter::VaultCipher;
use super::format::{self, VaultState};
use super::items::{self, ExtractTarget, ItemFailure};
use super::store::{self, VaultContents};
use crate::cli::output::{self, Reporter};
use crate::codec;
use crate::errors::{BlobVaultError, Result};

/// Where the vault lives and how to unlock it.
#[derive(Clone, Copy)]
pub struct VaultHandle<'a> {
    pub path: &'a Path,
    pub cipher_name: &'a str,
    pub password: &'a [u8],
}

/// Summary of an `add`.
#[derive(Debug, Default)]
pub struct AddReport {
    /// Entries parsed from the command line.
    pub added: usize,
    /// Entries in the vault afterwards.
    pub total: usize,
    /// `true` if this call created the vault file.
    pub created: bool,
    /// Items skipped because they were malformed or unreadable.
    pub failures: Vec<ItemFailure>,
}

/// Summary of an `extract`.
#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Keys written, with their target paths.
    pub extracted: Vec<ExtractTarget>,
    /// Keys that could not be extracted.
    pub failures: Vec<ItemFailure>,
}

/// Runs vault operations against a cipher.
///
/// Assumes exclusive access to the vault file for the duration of a
/// call.  Running two operations on the same path at once is the
/// caller's problem: there is no file locking.
pub struct VaultWorkflow<C> {
    cipher: C,
    reporter: Reporter,
}

impl<C: VaultCipher> VaultWorkflow<C> {
    pub fn new(cipher: C, reporter: Reporter) -> Self {
        Self { cipher, reporter }
    }

    /// Merge `key=value` items into the vault, creating it if absent.
    ///
    /// New entries replace existing entries with the same key.  With
    /// `truncate`, existing entries are discarded first (the password is
    /// still checked against the old vault).
    pub fn add<S: AsRef<str>>(
        &self,
        vault: &VaultHandle<'_>,
        raw_items: &[S],
        truncate: bool,
    ) -> Result<AddReport> {
        self.reporter
            .info(&format!("Adding entries to {}", vault.path.display()));

        // Read any referenced files before the vault is decrypted.
        let parsed = items::parse_items(raw_items);
        for failure in &parsed.failures {
            self.reporter
                .error(&format!("Skipping '{}': {}", failure.item, failure.error));
        }
        self.reporter
            .info(&format!("Parsed {} entries", parsed.entries.len()));

        let state = format::detect_state(vault.path)?;
        let mut report = AddReport {
            added: parsed.entries.len(),
            created: state == VaultState::Absent,
            failures: parsed.failures,
            ..AddReport::default()
        };

        if state == VaultState::Absent && parsed.entries.is_empty() {
            self.reporter.warning("Nothing to add — vault not created");
            report.created = false;
            return Ok(report);
        }

        let mut guard = UnsealedVault::acquire(&self.cipher, vault, state, Reseal::Encrypt)?;
        let outcome = merge_into(&mut guard, parsed.entries, truncate);
        report.total = settle(outcome, guard.seal())?;

        self.reporter.success(&format!(
            "Added {} entries to {} ({} total)",
            report.added,
            vault.path.display(),
            report.total
        ));
        Ok(report)
    }

    /// Decode stored entries and write them to the requested files.
    ///
    /// A missing vault is a no-op.  Per-key failures are reported and do
    /// not stop the remaining keys.
    pub fn extract<S: AsRef<str>>(
        &self,
        vault: &VaultHandle<'_>,
        raw_items: &[S],
    ) -> Result<ExtractReport> {
        let state = format::detect_state(vault.path)?;
        if state == VaultState::Absent {
            self.reporter.info(&format!(
                "No vault at {} — nothing to extract",
                vault.path.display()
            ));
            return Ok(ExtractReport::default());
        }

        let (targets, failures) = items::parse_targets(raw_items);
        let mut report = ExtractReport {
            extracted: Vec::with_capacity(targets.len()),
            failures,
        };
        for failure in &report.failures {
            self.reporter
                .error(&format!("Skipping '{}': {}", failure.item, failure.error));
        }

        let reseal = match state {
            VaultState::Encrypted => Reseal::RestoreOriginal,
            _ => Reseal::Never,
        };
        let guard = UnsealedVault::acquire(&self.cipher, vault, state, reseal)?;
        let outcome = store::load(vault.path).map(|contents| {
            for target in targets {
                self.extract_one(&contents, target, &mut report);
            }
        });
        settle(outcome, guard.seal())?;

        Ok(report)
    }

    fn extract_one(
        &self,
        contents: &VaultContents,
        target: ExtractTarget,
        report: &mut ExtractReport,
    ) {
        match write_entry(contents, &target) {
            Ok(()) => {
                self.reporter.success(&format!(
                    "Extracted {} to {}",
                    target.key,
                    target.path.display()
                ));
                report.extracted.push(target);
            }
            Err(error) => {
                self.reporter.error(&format!(
                    "Could not extract {} to {}: {error}",
                    target.key,
                    target.path.display()
                ));
                report.failures.push(ItemFailure {
                    item: format!("{}={}", target.key, target.path.display()),
                    error,
                });
            }
        }
    }
}

/// Load, merge and write the plaintext vault.  Returns the entry count.
fn merge_into<C: VaultCipher>(
    guard: &mut UnsealedVault<'_, C>,
    incoming: VaultContents,
    truncate: bool,
) -> Result<usize> {
    let path = guard.vault.path;
    let existing = if truncate {
        VaultContents::new()
    } else {
        store::load(path)?
    };

    let merged = store::merge(existing, incoming);
    store::write(&merged, path)?;
    guard.mark_written();
    Ok(merged.len())
}

/// Combine the operation result with the result of sealing.
///
/// A vault left insecure always wins, carrying the operation error in its
/// reason.  Otherwise the operation error comes first.
fn settle<T>(outcome: Result<T>, sealed: Result<()>) -> Result<T> {
    match (outcome, sealed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(seal_err)) => Err(seal_err),
        (Err(op_err), Err(BlobVaultError::VaultLeftInsecure { path, reason })) => {
            Err(BlobVaultError::VaultLeftInsecure {
                path,
                reason: format!("{reason}; the operation itself failed: {op_err}"),
            })
        }
        (Err(op_err), _) => Err(op_err),
    }
}

fn write_entry(contents: &VaultContents, target: &ExtractTarget) -> Result<()> {
    let value = contents
        .get(&target.key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BlobVaultError::EntryNotFound(target.key.clone()))?;

    let bytes = Zeroizing::new(codec::decode(value)?);
    store::write_atomic(&target.path, &bytes)
}

// ---------------------------------------------------------------------------
// Scoped plaintext window
// ---------------------------------------------------------------------------

/// What the guard does with exposed plaintext on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reseal {
    /// Encrypt the current plaintext with the handle's cipher.
    Encrypt,
    /// Write back the ciphertext that was on disk before decrypting.
    RestoreOriginal,
    /// Leave the file as it is (it was plaintext to begin with).
    Never,
}

/// A vault that is (or may become) plaintext on disk.
///
/// Call `seal` on every path out of the operation.  If the guard is
/// dropped without it (early return, panic), `Drop` seals instead.
struct UnsealedVault<'a, C: VaultCipher> {
    cipher: &'a C,
    vault: &'a VaultHandle<'a>,
    /// State of the file when the operation began.
    initial_state: VaultState,
    /// Bytes on disk when the operation began.
    original: Option<Zeroizing<Vec<u8>>>,
    /// Whether readable plaintext is currently on disk.
    exposed: bool,
    reseal: Reseal,
    finished: bool,
}

impl<'a, C: VaultCipher> UnsealedVault<'a, C> {
    /// Snapshot the file and decrypt it if it is encrypted.
    fn acquire(
        cipher: &'a C,
        vault: &'a VaultHandle<'a>,
        state: VaultState,
        reseal: Reseal,
    ) -> Result<Self> {
        let original = match state {
            VaultState::Absent => None,
            _ => Some(Zeroizing::new(fs::read(vault.path)?)),
        };

        if state == VaultState::Encrypted {
            if let Err(e) = cipher.decrypt(vault.path, vault.cipher_name, vault.password) {
                let snapshot = original.as_ref().map(|b| b.as_slice());
                if let Err(reason) = restore_if_changed(vault.path, snapshot) {
                    return Err(BlobVaultError::VaultLeftInsecure {
                        path: vault.path.to_path_buf(),
                        reason: format!("{e}; {reason}"),
                    });
                }
                return Err(e);
            }
        }

        Ok(Self {
            cipher,
            vault,
            initial_state: state,
            original,
            exposed: state != VaultState::Absent,
            reseal,
            finished: false,
        })
    }

    /// Record that plaintext now exists at the vault path.
    fn mark_written(&mut self) {
        self.exposed = true;
    }

    /// Seal the vault again, rolling back if that fails.
    fn seal(mut self) -> Result<()> {
        self.finished = true;
        self.finish()
    }

    fn finish(&mut self) -> Result<()> {
        if !self.exposed {
            return Ok(());
        }

        let v = self.vault;
        let sealed = match (self.reseal, self.original.as_ref()) {
            (Reseal::Never, _) => return Ok(()),
            (Reseal::RestoreOriginal, Some(bytes)) => store::write_atomic(v.path, bytes),
            _ => self.cipher.encrypt(v.path, v.cipher_name, v.password),
        };
        match sealed {
            Ok(()) => {
                self.exposed = false;
                Ok(())
            }
            Err(cause) => Err(self.roll_back(cause)),
        }
    }

    /// Undo the plaintext exposure after a failed encrypt.
    fn roll_back(&mut self, cause: BlobVaultError) -> BlobVaultError {
        let path = self.vault.path;
        let restored = match (self.initial_state, self.original.as_ref().map(|b| b.as_slice())) {
            (VaultState::Encrypted, Some(bytes)) => store::write_atomic(path, bytes)
                .map_err(|e| format!("{cause}; restoring the previous vault failed: {e}")),
            (VaultState::Absent, _) => fs::remove_file(path)
                .map_err(|e| format!("{cause}; removing the plaintext vault failed: {e}")),
            _ => Err(format!("{cause}; the vault was not encrypted before")),
        };

        match restored {
            Ok(()) => {
                self.exposed = false;
                cause
            }
            Err(reason) => BlobVaultError::VaultLeftInsecure {
                path: path.to_path_buf(),
                reason,
            },
        }
    }
}

impl<C: VaultCipher> Drop for UnsealedVault<'_, C> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if let Err(e) = self.finish() {
            output::error(&e.to_string());
        }
    }
}

/// Put `original` back if a failed decrypt left the file modified.
///
/// An unreadable file counts as modified.  Fails only if the rewrite
/// itself fails.
fn restore_if_changed(path: &Path, original: Option<&[u8]>) -> std::result::Result<(), String> {
    let Some(bytes) = original else { return Ok(()) };
    if matches!(fs::read(path), Ok(now) if now == bytes) {
        return Ok(());
    }
    store::write_atomic(path, bytes)
        .map_err(|e| format!("restoring the previous vault failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Argon2Params;
    use crate::vault::adapter::FileCipher;
    use tempfile::TempDir;

    const PASSWORD: &[u8] = b"pw";

    fn cipher() -> FileCipher {
        FileCipher::new(Argon2Params {
            memory_kib: 8_192,
            iterations: 1,
            parallelism: 1,
        })
    }

    fn sealed_vault(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("vault");
        fs::write(&path, "{\"k\": \"AQID\"}\n").unwrap();
        cipher().encrypt(&path, "AES256", PASSWORD).unwrap();
        path
    }

    fn handle(path: &Path) -> VaultHandle<'_> {
        VaultHandle {
            path,
            cipher_name: "AES256",
            password: PASSWORD,
        }
    }

    #[test]
    fn dropped_guard_encrypts_the_vault_again() {
        let dir = TempDir::new().unwrap();
        let path = sealed_vault(&dir);
        let cipher = cipher();
        let vault = handle(&path);

        let guard =
            UnsealedVault::acquire(&cipher, &vault, VaultState::Encrypted, Reseal::Encrypt)
                .unwrap();
        assert!(!format::is_encrypted(&path).unwrap());
        assert_eq!(store::load(&path).unwrap()["k"], "AQID");

        drop(guard);
        assert!(format::is_encrypted(&path).unwrap());
    }

    #[test]
    fn dropped_guard_puts_the_original_ciphertext_back() {
        let dir = TempDir::new().unwrap();
        let path = sealed_vault(&dir);
        let before = fs::read(&path).unwrap();
        let cipher = cipher();
        let vault = handle(&path);

        let guard = UnsealedVault::acquire(
            &cipher,
            &vault,
            VaultState::Encrypted,
            Reseal::RestoreOriginal,
        )
        .unwrap();
        assert!(!format::is_encrypted(&path).unwrap());

        drop(guard);
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn settle_keeps_the_operation_error_in_an_insecure_vault() {
        let outcome: Result<()> = Err(BlobVaultError::SerializationError("bad json".into()));
        let sealed = Err(BlobVaultError::VaultLeftInsecure {
            path: "v".into(),
            reason: "encryption failed".into(),
        });

        match settle(outcome, sealed) {
            Err(BlobVaultError::VaultLeftInsecure { reason, .. }) => {
                assert!(reason.contains("encryption failed"));
                assert!(reason.contains("bad json"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn settle_prefers_the_operation_error_after_a_clean_rollback() {
        let outcome: Result<()> = Err(BlobVaultError::EntryNotFound("k".into()));
        let sealed = Err(BlobVaultError::EncryptionFailed("injected".into()));
        assert!(matches!(
            settle(outcome, sealed),
            Err(BlobVaultError::EntryNotFound(_))
        ));
    }
}
