//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! Parameters are fixed by design: 100 000 iterations, a 32-byte
//! output, and a 16-byte random salt. Unlike a memory-hard KDF, PBKDF2
//! has no tunable memory cost — the iteration count is the only lever,
//! and this module deliberately makes it non-configurable so every
//! vault on disk was derived the same way.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

use crate::errors::Result;

/// Length of the salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Fixed PBKDF2 iteration count. Raising this would silently break
/// every existing vault's master key derivation, so it is not exposed
/// as configuration — see `VaultConfig::kdf_iterations` for the floor
/// enforced on any future increase.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Derive a 32-byte master key from a password and salt.
///
/// Deterministic: the same password, salt, and iteration count always
/// produce the same key.
pub fn derive_master_key(password: &[u8], salt: &[u8]) -> Result<[u8; KEY_LEN]> {
    derive_master_key_with_iterations(password, salt, PBKDF2_ITERATIONS)
}

/// Derive a 32-byte master key with an explicit iteration count.
///
/// Exists so tests can exercise weaker parameters quickly; production
/// code paths should call `derive_master_key`.
pub fn derive_master_key_with_iterations(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<[u8; KEY_LEN]> {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key);
    Ok(key)
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_inputs() {
        let salt = [1u8; SALT_LEN];
        let k1 = derive_master_key(b"hunter2", &salt).unwrap();
        let k2 = derive_master_key(b"hunter2", &salt).unwrap();
        assert_eq!(k1, k2);
    }

    #[test]
    fn differs_with_different_password() {
        let salt = [1u8; SALT_LEN];
        let k1 = derive_master_key(b"hunter2", &salt).unwrap();
        let k2 = derive_master_key(b"hunter3", &salt).unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn differs_with_different_salt() {
        let k1 = derive_master_key(b"hunter2", &[1u8; SALT_LEN]).unwrap();
        let k2 = derive_master_key(b"hunter2", &[2u8; SALT_LEN]).unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn generate_salt_is_right_length() {
        assert_eq!(generate_salt().len(), SALT_LEN);
    }
}
