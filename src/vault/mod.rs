//! Vault module — the encrypted key-value file and its lifecycle.
//!
//! This module provides:
//! - The encrypted envelope format and state detection (`format`)
//! - In-place encrypt/decrypt of vault files (`adapter`)
//! - The plaintext key-value store (`store`)
//! - `key=value` argument parsing (`items`)
//! - The `add` / `extract` operations (`workflow`)

pub mod adapter;
pub mod format;
pub mod items;
pub mod store;
pub mod workflow;

// Re-export the most commonly used items.
pub use adapter::{FileCipher, VaultCipher};
pub use format::{detect_state, is_encrypted, VaultState};
pub use items::{parse_items, parse_targets, ExtractTarget, ItemFailure, ParsedItems};
pub use store::VaultContents;
pub use workflow::{AddReport, ExtractReport, VaultHandle, VaultWorkflow};
