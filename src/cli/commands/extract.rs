//! `blobvault -e` — decode stored entries back into files.

use crate::cli::output::Reporter;
use crate::cli::{file_cipher, load_settings, resolve_password, Cli};
use crate::errors::Result;
use crate::vault::{VaultHandle, VaultWorkflow};

/// Execute the extract operation.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings()?;
    let cipher_name = cli.cipher_name(&settings);
    cipher_name.parse::<crate::crypto::CipherKind>()?;

    // Nothing to unlock: skip the password prompt entirely.
    if !cli.vault.exists() {
        Reporter::new(cli.quiet).info(&format!(
            "No vault at {} — nothing to extract",
            cli.vault.display()
        ));
        return Ok(());
    }

    let password = resolve_password(cli)?;
    let vault = VaultHandle {
        path: &cli.vault,
        cipher_name: &cipher_name,
        password: password.as_bytes(),
    };

    let workflow = VaultWorkflow::new(file_cipher(&settings), Reporter::new(cli.quiet));
    let report = workflow.extract(&vault, &cli.items)?;

    if !report.failures.is_empty() {
        Reporter::new(cli.quiet).warning(&format!(
            "{} of {} items could not be extracted",
            report.failures.len(),
            report.failures.len() + report.extracted.len()
        ));
    }
    Ok(())
}
