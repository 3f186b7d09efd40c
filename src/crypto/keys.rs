//! The in-memory master key.
//!
//! Wraps the 32-byte key derived by `kdf::derive_master_key` so it
//! zero-fills on drop and can never accidentally be formatted or
//! logged (it intentionally does not implement `Debug`/`Display`).

use zeroize::Zeroize;

/// A 32-byte symmetric key held only while the vault is `UNLOCKED`.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; 32],
}

impl MasterKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}
