//! Cryptographic primitives for the vault engine.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - PBKDF2-HMAC-SHA256 password-based key derivation (`kdf`)
//! - The zeroizing `MasterKey` wrapper (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_master_key, ...};
pub use encryption::{
    constant_time_equal, decrypt, decrypt_detached, encrypt, encrypt_detached, generate_nonce,
    verify_password,
};
pub use kdf::{derive_master_key, generate_salt};
pub use keys::MasterKey;
