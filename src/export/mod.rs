//! Export/import codec — a portable, encrypted bundle of secrets.
//!
//! Wire layout: `"SECRETS_EXPORT_V1"` (17B) | salt(16) | iv(12) | tag(16) | ciphertext.
//! The plaintext is a UTF-8 JSON array of entries. The export password
//! is independent of the vault master password and has its own,
//! lower, strength floor.

use serde::{Deserialize, Serialize};

use crate::crypto;
use crate::crypto::kdf::{derive_master_key, generate_salt, SALT_LEN};
use crate::errors::{Result, VaultError};
use crate::model::Environment;

const MAGIC: &[u8] = b"SECRETS_EXPORT_V1";
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const MIN_EXPORT_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEntry {
    pub key: String,
    pub value: String,
    pub environment: Environment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// The export password floor is intentionally lower than the master
/// password's — it protects a transient file, not the vault itself.
pub fn validate_export_password(password: &str) -> Result<()> {
    if password.len() < MIN_EXPORT_PASSWORD_LEN {
        return Err(VaultError::InvalidPassword(vec![format!(
            "export password must be at least {MIN_EXPORT_PASSWORD_LEN} characters"
        )]));
    }
    Ok(())
}

pub fn create_export(entries: &[ExportEntry], password: &str) -> Result<Vec<u8>> {
    validate_export_password(password)?;

    let plaintext = serde_json::to_vec(entries)
        .map_err(|e| VaultError::SerializationError(e.to_string()))?;

    let salt = generate_salt();
    let key = derive_master_key(password.as_bytes(), &salt)?;
    let nonce = crypto::generate_nonce();
    let (ciphertext, tag) = crypto::encrypt_detached(&key, &nonce, &plaintext)?;

    let mut out = Vec::with_capacity(MAGIC.len() + SALT_LEN + NONCE_LEN + TAG_LEN + ciphertext.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&salt);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&tag);
    out.extend_from_slice(&ciphertext);

    Ok(out)
}

pub fn parse_export(blob: &[u8], password: &str) -> Result<Vec<ExportEntry>> {
    let header_len = MAGIC.len() + SALT_LEN + NONCE_LEN + TAG_LEN;
    if blob.len() < header_len {
        return Err(VaultError::InvalidExportFormat("truncated header".into()));
    }
    if &blob[..MAGIC.len()] != MAGIC {
        return Err(VaultError::InvalidExportFormat("bad magic".into()));
    }

    let mut offset = MAGIC.len();
    let salt = &blob[offset..offset + SALT_LEN];
    offset += SALT_LEN;
    let nonce: [u8; NONCE_LEN] = blob[offset..offset + NONCE_LEN].try_into().unwrap();
    offset += NONCE_LEN;
    let tag: [u8; TAG_LEN] = blob[offset..offset + TAG_LEN].try_into().unwrap();
    offset += TAG_LEN;
    let ciphertext = &blob[offset..];

    let key = derive_master_key(password.as_bytes(), salt)?;
    let plaintext = crypto::decrypt_detached(&key, &nonce, ciphertext, &tag)?;

    serde_json::from_slice(&plaintext)
        .map_err(|e| VaultError::InvalidExportFormat(format!("bad payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ExportEntry> {
        vec![
            ExportEntry {
                key: "API_KEY".into(),
                value: "key123".into(),
                environment: Environment::Dev,
                description: None,
                tags: None,
            },
            ExportEntry {
                key: "DB_URL".into(),
                value: "postgres://localhost/db".into(),
                environment: Environment::All,
                description: Some("primary database".into()),
                tags: Some(vec!["db".into()]),
            },
        ]
    }

    #[test]
    fn roundtrip() {
        let blob = create_export(&sample(), "export-password").unwrap();
        let parsed = parse_export(&blob, "export-password").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].key, "API_KEY");
        assert_eq!(parsed[1].description.as_deref(), Some("primary database"));
    }

    #[test]
    fn wrong_password_fails() {
        let blob = create_export(&sample(), "export-password").unwrap();
        assert!(parse_export(&blob, "wrong-password").is_err());
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut blob = create_export(&sample(), "export-password").unwrap();
        blob[0] ^= 0xFF;
        assert!(parse_export(&blob, "export-password").is_err());
    }

    #[test]
    fn rejects_short_export_password() {
        assert!(create_export(&sample(), "short").is_err());
    }

    #[test]
    fn truncated_blob_is_rejected() {
        assert!(parse_export(b"too short", "export-password").is_err());
    }
}
