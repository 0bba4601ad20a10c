//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects against brute-force and
//! GPU-based attacks.  The parameters used to seal a vault are written
//! into its payload, so opening never depends on the current settings.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use crate::errors::{BlobVaultError, Result};

/// Length of the salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Length of the derived key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Maximum memory cost in KiB (4 GB).
const MAX_MEMORY_KIB: u32 = 4 * 1024 * 1024;

/// Maximum number of iterations.
const MAX_ITERATIONS: u32 = 64;

/// Maximum number of parallelism lanes.
const MAX_PARALLELISM: u32 = 64;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Argon2Params {
    /// Returns `true` if every cost stays under its upper bound.
    ///
    /// Parameters read from a vault file must pass this before any key
    /// is derived: a corrupted field would otherwise allocate or loop
    /// without limit.
    pub fn within_limits(&self) -> bool {
        self.memory_kib <= MAX_MEMORY_KIB
            && self.iterations <= MAX_ITERATIONS
            && self.parallelism <= MAX_PARALLELISM
    }
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// Derive a 32-byte key from a password and salt with explicit params.
///
/// The same password + salt + params always produce the same key.
/// Rejects parameters below the minimums so a tampered payload cannot
/// downgrade the KDF, and above the maximums so it cannot exhaust memory
/// or CPU.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    argon2_params: &Argon2Params,
) -> Result<[u8; KEY_LEN]> {
    if argon2_params.memory_kib < MIN_MEMORY_KIB {
        return Err(BlobVaultError::KeyDerivationFailed(format!(
            "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
            argon2_params.memory_kib
        )));
    }
    if argon2_params.iterations < 1 {
        return Err(BlobVaultError::KeyDerivationFailed(
            "Argon2 iterations must be at least 1".into(),
        ));
    }
    if argon2_params.parallelism < 1 {
        return Err(BlobVaultError::KeyDerivationFailed(
            "Argon2 parallelism must be at least 1".into(),
        ));
    }

    if !argon2_params.within_limits() {
        return Err(BlobVaultError::KeyDerivationFailed(format!(
            "Argon2 params exceed limits (memory_kib <= {MAX_MEMORY_KIB}, \
             iterations <= {MAX_ITERATIONS}, parallelism <= {MAX_PARALLELISM})"
        )));
    }

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| BlobVaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| BlobVaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> Argon2Params {
        Argon2Params {
            memory_kib: 8_192,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn derivation_is_deterministic() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key(b"pw", &salt, &fast()).unwrap();
        let b = derive_key(b"pw", &salt, &fast()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_salts_give_different_keys() {
        let a = derive_key(b"pw", &[1u8; SALT_LEN], &fast()).unwrap();
        let b = derive_key(b"pw", &[2u8; SALT_LEN], &fast()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_weak_memory_cost() {
        let weak = Argon2Params {
            memory_kib: 1_024,
            ..fast()
        };
        assert!(derive_key(b"pw", &[0u8; SALT_LEN], &weak).is_err());
    }

    #[test]
    fn rejects_excessive_costs() {
        let huge_memory = Argon2Params {
            memory_kib: u32::MAX,
            ..fast()
        };
        assert!(!huge_memory.within_limits());
        assert!(derive_key(b"pw", &[0u8; SALT_LEN], &huge_memory).is_err());

        let many_passes = Argon2Params {
            iterations: 200_000,
            ..fast()
        };
        assert!(derive_key(b"pw", &[0u8; SALT_LEN], &many_passes).is_err());

        assert!(Argon2Params::default().within_limits());
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
