//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{BlobVaultError, Result};
use crate::vault::FileCipher;

const AFTER_HELP: &str = "\
Examples:
  Store a certificate, its key and a password:
    blobvault -v prod_certs.vault -i prod_cert=./prod.crt -i prod_key=./prod.key -i prod_password=s3cret

  Write a stored file back out:
    blobvault -v prod_certs.vault -e -i prod_cert=/tmp/prod.crt

Values naming an existing file are stored base64 encoded.";

/// BlobVault CLI: encrypted key-value vault for secrets and binary keys.
#[derive(Parser, Debug)]
#[command(
    name = "blobvault",
    about = "Create or update an encrypted key-value vault",
    long_about = "Create or update an encrypted key-value vault. \
                  If a value is a file on the filesystem, its contents are read and base64 encoded.",
    after_help = AFTER_HELP,
    version
)]
pub struct Cli {
    /// The vault file to create, update or read
    #[arg(short = 'v', long = "vault", value_name = "PATH")]
    pub vault: PathBuf,

    /// Items as key=value pairs (key=target_path with -e)
    #[arg(
        short = 'i',
        long = "item",
        value_name = "KEY=VALUE",
        num_args = 1..,
        required = true
    )]
    pub items: Vec<String>,

    /// Vault password (prompted for if omitted)
    #[arg(short = 'p', long = "password")]
    pub password: Option<String>,

    /// Cipher to seal the vault with (default: AES256)
    #[arg(short = 'c', long = "cipher", value_name = "NAME")]
    pub cipher: Option<String>,

    /// Suppress progress and per-item messages
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Extract entries to files instead of adding them
    #[arg(short = 'e', long = "extract")]
    pub extract: bool,

    /// Discard existing entries before adding
    #[arg(short = 't', long = "truncate", conflicts_with = "extract")]
    pub truncate: bool,
}

impl Cli {
    /// The cipher name: `-c`, else the configured default.
    pub fn cipher_name(&self, settings: &Settings) -> String {
        self.cipher
            .clone()
            .unwrap_or_else(|| settings.default_cipher.clone())
    }
}

// ---------------------------------------------------------------------------
// Shared helpers used by both commands
// ---------------------------------------------------------------------------

/// Get the vault password from `-p`, or prompt for it.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn resolve_password(cli: &Cli) -> Result<Zeroizing<String>> {
    if let Some(pw) = &cli.password {
        if !cli.quiet {
            output::warning("Password provided on command line — it may appear in shell history.");
        }
        return Ok(Zeroizing::new(pw.clone()));
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter vault password")
        .interact()
        .map_err(|e| BlobVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Load `.blobvault.toml` from the working directory.
pub fn load_settings() -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    Settings::load(&cwd)
}

/// The file cipher configured by `settings`.
pub fn file_cipher(settings: &Settings) -> FileCipher {
    FileCipher::new(settings.argon2_params())
}
