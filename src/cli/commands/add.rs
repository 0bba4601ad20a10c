//! `blobvault` (default mode) — merge items into the vault.

use crate::cli::output::Reporter;
use crate::cli::{file_cipher, load_settings, resolve_password, Cli};
use crate::errors::Result;
use crate::vault::{VaultHandle, VaultWorkflow};

/// Execute the add operation.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings()?;
    let cipher_name = cli.cipher_name(&settings);
    // Fail on an unknown cipher before prompting or touching the vault.
    cipher_name.parse::<crate::crypto::CipherKind>()?;

    let password = resolve_password(cli)?;
    let vault = VaultHandle {
        path: &cli.vault,
        cipher_name: &cipher_name,
        password: password.as_bytes(),
    };

    let workflow = VaultWorkflow::new(file_cipher(&settings), Reporter::new(cli.quiet));
    workflow.add(&vault, &cli.items, cli.truncate)?;
    Ok(())
}
