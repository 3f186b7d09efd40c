//! AES-256-GCM authenticated encryption.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext (which already carries its 16-byte
//! auth tag, appended by the AEAD implementation). The whole blob is
//! base64-encoded so every layer above this one is string-typed.
//!
//! Layout of the decoded byte buffer:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::errors::{Result, VaultError};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` with a 32-byte `key`.
///
/// Returns `base64(nonce || ciphertext || tag)`.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<String> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| VaultError::DecryptionFailed)?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);

    Ok(BASE64.encode(blob))
}

/// Decrypt a base64 blob produced by `encrypt`.
///
/// Fails with `DecryptionFailed` if the blob is not valid base64, is
/// too short to contain a nonce and a tag, or fails AEAD verification.
pub fn decrypt(key: &[u8], blob_b64: &str) -> Result<Vec<u8>> {
    let blob = BASE64
        .decode(blob_b64)
        .map_err(|_| VaultError::DecryptionFailed)?;

    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(VaultError::DecryptionFailed);
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| VaultError::DecryptionFailed)?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| VaultError::DecryptionFailed)
}

/// Generate a cryptographically random 12-byte nonce.
///
/// `encrypt` generates its own nonce internally; this is exposed for
/// callers (e.g. the backup/export codecs) that build their own binary
/// framing around a raw AEAD call instead of going through `encrypt`.
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypt with an explicit nonce, returning ciphertext and its
/// authentication tag as separate buffers rather than one appended
/// blob. Used by the backup/export codecs, whose wire framing keeps
/// the tag in a fixed-width header field ahead of the ciphertext.
pub fn encrypt_detached(
    key: &[u8],
    nonce_bytes: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; TAG_LEN])> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("invalid key length: {e}")))?;
    let nonce = Nonce::from_slice(nonce_bytes);

    let mut combined = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| VaultError::DecryptionFailed)?;

    let tag_start = combined.len() - TAG_LEN;
    let tag_bytes = combined.split_off(tag_start);
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&tag_bytes);

    Ok((combined, tag))
}

/// Inverse of `encrypt_detached`.
pub fn decrypt_detached(
    key: &[u8],
    nonce_bytes: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    tag: &[u8; TAG_LEN],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| VaultError::DecryptionFailed)?;
    let nonce = Nonce::from_slice(nonce_bytes);

    let mut combined = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    combined.extend_from_slice(ciphertext);
    combined.extend_from_slice(tag);

    cipher
        .decrypt(nonce, combined.as_slice())
        .map_err(|_| VaultError::DecryptionFailed)
}

/// Compare two byte slices in constant time with respect to their
/// shared length. Slices of different lengths are never equal, and
/// that length check is not constant-time, but no secret ever hinges
/// on *how much longer* one buffer is than another here.
pub fn constant_time_equal(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Verify a candidate plaintext against an encrypted sentinel.
///
/// Decrypts `encrypted_sentinel` under `key` and compares the result
/// to `expected_plaintext` in constant time. Any decryption error is
/// treated as "does not match" rather than propagated — a failed
/// unlock attempt should never distinguish "bad key" from "corrupt
/// sentinel" to the caller.
pub fn verify_password(key: &[u8], expected_plaintext: &[u8], encrypted_sentinel: &str) -> bool {
    match decrypt(key, encrypted_sentinel) {
        Ok(decrypted) => constant_time_equal(&decrypted, expected_plaintext),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> [u8; 32] {
        [0x42u8; 32]
    }

    #[test]
    fn roundtrip() {
        let ct = encrypt(&key(), b"hello world").unwrap();
        let pt = decrypt(&key(), &ct).unwrap();
        assert_eq!(pt, b"hello world");
    }

    #[test]
    fn encrypt_is_nondeterministic() {
        let a = encrypt(&key(), b"same plaintext").unwrap();
        let b = encrypt(&key(), b"same plaintext").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn tampering_any_byte_breaks_decryption() {
        let ct_b64 = encrypt(&key(), b"secret").unwrap();
        let mut raw = BASE64.decode(&ct_b64).unwrap();
        let tamper_index = raw.len() - 1;
        raw[tamper_index] ^= 0xFF;
        let tampered = BASE64.encode(raw);
        assert!(decrypt(&key(), &tampered).is_err());
    }

    #[test]
    fn tampering_nonce_breaks_decryption() {
        let ct_b64 = encrypt(&key(), b"secret").unwrap();
        let mut raw = BASE64.decode(&ct_b64).unwrap();
        raw[0] ^= 0xFF;
        let tampered = BASE64.encode(raw);
        assert!(decrypt(&key(), &tampered).is_err());
    }

    #[test]
    fn too_short_blob_fails() {
        let tiny = BASE64.encode([0u8; 4]);
        assert!(decrypt(&key(), &tiny).is_err());
    }

    #[test]
    fn invalid_base64_fails() {
        assert!(decrypt(&key(), "not base64 !!!").is_err());
    }

    #[test]
    fn verify_password_matches_correct_plaintext() {
        let sentinel = encrypt(&key(), b"secrets-manager-v1").unwrap();
        assert!(verify_password(&key(), b"secrets-manager-v1", &sentinel));
    }

    #[test]
    fn verify_password_rejects_wrong_key() {
        let sentinel = encrypt(&key(), b"secrets-manager-v1").unwrap();
        assert!(!verify_password(&[0x99u8; 32], b"secrets-manager-v1", &sentinel));
    }

    #[test]
    fn detached_roundtrip() {
        let nonce = generate_nonce();
        let (ciphertext, tag) = encrypt_detached(&key(), &nonce, b"backup payload").unwrap();
        let plaintext = decrypt_detached(&key(), &nonce, &ciphertext, &tag).unwrap();
        assert_eq!(plaintext, b"backup payload");
    }

    #[test]
    fn detached_tag_mismatch_fails() {
        let nonce = generate_nonce();
        let (ciphertext, mut tag) = encrypt_detached(&key(), &nonce, b"backup payload").unwrap();
        tag[0] ^= 0xFF;
        assert!(decrypt_detached(&key(), &nonce, &ciphertext, &tag).is_err());
    }

    #[test]
    fn constant_time_equal_basic() {
        assert!(constant_time_equal(b"abc", b"abc"));
        assert!(!constant_time_equal(b"abc", b"abd"));
        assert!(!constant_time_equal(b"abc", b"abcd"));
    }
}
