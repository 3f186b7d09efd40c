//! Backup codec — versioned, optionally-encrypted snapshots of the
//! whole vault database file.
//!
//! Wire layout:
//!   plain:     0x00 | u32 BE metadata_len | metadata_json | vault_bytes
//!   encrypted: 0x01 | salt(16) | iv(12) | tag(16) | u32 BE metadata_len | metadata_json | ciphertext
//!
//! `metadata_json` is always stored in the clear, even in the
//! encrypted variant — it is display-only (version, timestamp), never
//! a secret. Encryption, when requested, uses a password independent
//! of the vault's own master password.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto;
use crate::crypto::kdf::{derive_master_key, generate_salt, SALT_LEN};
use crate::errors::{Result, VaultError};
use crate::model::now_millis;

const PLAIN_MARKER: u8 = 0x00;
const ENCRYPTED_MARKER: u8 = 0x01;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub version: String,
    pub created_at: i64,
    /// Always written as 0 — consumers cannot rely on this field.
    pub secrets_count: u64,
}

/// Build a backup blob from the raw database file at `db_path`.
/// `password`, if given, AEAD-encrypts the vault bytes under its own
/// derived key; otherwise the blob is plaintext framing only.
pub fn create_backup(db_path: &Path, password: Option<&str>) -> Result<Vec<u8>> {
    let vault_bytes = fs::read(db_path)?;
    let metadata = BackupMetadata {
        version: crate::store::SCHEMA_VERSION.to_string(),
        created_at: now_millis(),
        secrets_count: 0,
    };
    let metadata_json = serde_json::to_vec(&metadata)
        .map_err(|e| VaultError::SerializationError(e.to_string()))?;

    let mut out = Vec::new();

    match password {
        None => {
            out.push(PLAIN_MARKER);
            out.extend_from_slice(&(metadata_json.len() as u32).to_be_bytes());
            out.extend_from_slice(&metadata_json);
            out.extend_from_slice(&vault_bytes);
        }
        Some(pw) => {
            let salt = generate_salt();
            let key = derive_master_key(pw.as_bytes(), &salt)?;
            let nonce = crypto::generate_nonce();
            let (ciphertext, tag) = crypto::encrypt_detached(&key, &nonce, &vault_bytes)?;

            out.push(ENCRYPTED_MARKER);
            out.extend_from_slice(&salt);
            out.extend_from_slice(&nonce);
            out.extend_from_slice(&tag);
            out.extend_from_slice(&(metadata_json.len() as u32).to_be_bytes());
            out.extend_from_slice(&metadata_json);
            out.extend_from_slice(&ciphertext);
        }
    }

    Ok(out)
}

struct ParsedBackup {
    metadata: BackupMetadata,
    vault_bytes: Vec<u8>,
}

fn parse_backup(blob: &[u8], password: Option<&str>) -> Result<ParsedBackup> {
    if blob.is_empty() {
        return Err(VaultError::InvalidBackupFormat("empty backup".into()));
    }

    match blob[0] {
        PLAIN_MARKER => {
            if blob.len() < 5 {
                return Err(VaultError::InvalidBackupFormat("truncated header".into()));
            }
            let metadata_len = u32::from_be_bytes(blob[1..5].try_into().unwrap()) as usize;
            let metadata_start = 5;
            let metadata_end = metadata_start
                .checked_add(metadata_len)
                .filter(|&end| end <= blob.len())
                .ok_or_else(|| VaultError::InvalidBackupFormat("metadata length out of range".into()))?;

            let metadata: BackupMetadata = serde_json::from_slice(&blob[metadata_start..metadata_end])
                .map_err(|e| VaultError::InvalidBackupFormat(format!("bad metadata: {e}")))?;
            let vault_bytes = blob[metadata_end..].to_vec();

            Ok(ParsedBackup { metadata, vault_bytes })
        }
        ENCRYPTED_MARKER => {
            let password = password
                .ok_or_else(|| VaultError::InvalidBackupFormat("backup is encrypted; password required".into()))?;

            let header_len = 1 + SALT_LEN + NONCE_LEN + TAG_LEN + 4;
            if blob.len() < header_len {
                return Err(VaultError::InvalidBackupFormat("truncated header".into()));
            }

            let mut offset = 1;
            let salt = &blob[offset..offset + SALT_LEN];
            offset += SALT_LEN;
            let nonce: [u8; NONCE_LEN] = blob[offset..offset + NONCE_LEN].try_into().unwrap();
            offset += NONCE_LEN;
            let tag: [u8; TAG_LEN] = blob[offset..offset + TAG_LEN].try_into().unwrap();
            offset += TAG_LEN;
            let metadata_len = u32::from_be_bytes(blob[offset..offset + 4].try_into().unwrap()) as usize;
            offset += 4;

            let metadata_end = offset
                .checked_add(metadata_len)
                .filter(|&end| end <= blob.len())
                .ok_or_else(|| VaultError::InvalidBackupFormat("metadata length out of range".into()))?;
            let metadata: BackupMetadata = serde_json::from_slice(&blob[offset..metadata_end])
                .map_err(|e| VaultError::InvalidBackupFormat(format!("bad metadata: {e}")))?;

            let ciphertext = &blob[metadata_end..];
            let key = derive_master_key(password.as_bytes(), salt)?;
            let vault_bytes = crypto::decrypt_detached(&key, &nonce, ciphertext, &tag)?;

            Ok(ParsedBackup { metadata, vault_bytes })
        }
        other => Err(VaultError::InvalidBackupFormat(format!(
            "unknown backup marker byte 0x{other:02x}"
        ))),
    }
}

/// Restore `blob` over `db_path`. If a database already exists there,
/// it is copied aside into `backups_dir` as
/// `vault-pre-restore-<millis>.db` before being overwritten.
pub fn restore_backup(
    blob: &[u8],
    password: Option<&str>,
    db_path: &Path,
    backups_dir: &Path,
) -> Result<()> {
    let parsed = parse_backup(blob, password)?;

    if db_path.exists() {
        fs::create_dir_all(backups_dir)?;
        let pre_restore_path = backups_dir.join(format!("vault-pre-restore-{}.db", now_millis()));
        fs::copy(db_path, pre_restore_path)?;
    }

    write_atomic(db_path, &parsed.vault_bytes)?;
    set_file_permissions(db_path);

    Ok(())
}

/// Write `bytes` to `path` via a temp file in the same directory
/// followed by a rename. The rename ensures readers never see a
/// half-written database.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;

    Ok(())
}

/// List `.enc` backups in `backups_dir`, newest first by
/// `metadata.created_at`. Unreadable or malformed files are skipped.
pub fn list_backups(backups_dir: &Path) -> Result<Vec<(PathBuf, BackupMetadata)>> {
    if !backups_dir.exists() {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    for entry in fs::read_dir(backups_dir)? {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("enc") {
            continue;
        }
        let Ok(blob) = fs::read(&path) else { continue };
        // Metadata is always readable without a password.
        if let Ok(parsed) = parse_backup_metadata_only(&blob) {
            out.push((path, parsed));
        }
    }

    out.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at));
    Ok(out)
}

fn parse_backup_metadata_only(blob: &[u8]) -> Result<BackupMetadata> {
    if blob.is_empty() {
        return Err(VaultError::InvalidBackupFormat("empty backup".into()));
    }
    let (mut offset, header_ok) = match blob[0] {
        PLAIN_MARKER => (1usize, blob.len() >= 5),
        ENCRYPTED_MARKER => {
            let header_len = 1 + SALT_LEN + NONCE_LEN + TAG_LEN;
            (header_len, blob.len() >= header_len + 4)
        }
        other => {
            return Err(VaultError::InvalidBackupFormat(format!(
                "unknown backup marker byte 0x{other:02x}"
            )))
        }
    };
    if !header_ok {
        return Err(VaultError::InvalidBackupFormat("truncated header".into()));
    }

    let metadata_len = u32::from_be_bytes(blob[offset..offset + 4].try_into().unwrap()) as usize;
    offset += 4;
    let metadata_end = offset
        .checked_add(metadata_len)
        .filter(|&end| end <= blob.len())
        .ok_or_else(|| VaultError::InvalidBackupFormat("metadata length out of range".into()))?;

    serde_json::from_slice(&blob[offset..metadata_end])
        .map_err(|e| VaultError::InvalidBackupFormat(format!("bad metadata: {e}")))
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn plain_backup_roundtrip() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("vault.db");
        fs::write(&db_path, b"fake database bytes").unwrap();

        let blob = create_backup(&db_path, None).unwrap();
        assert_eq!(blob[0], PLAIN_MARKER);

        let restore_path = dir.path().join("restored.db");
        let backups_dir = dir.path().join("backups");
        restore_backup(&blob, None, &restore_path, &backups_dir).unwrap();

        assert_eq!(fs::read(&restore_path).unwrap(), b"fake database bytes");
    }

    #[test]
    fn encrypted_backup_requires_password() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("vault.db");
        fs::write(&db_path, b"sensitive bytes").unwrap();

        let blob = create_backup(&db_path, Some("backup-pw-123")).unwrap();
        assert_eq!(blob[0], ENCRYPTED_MARKER);

        let restore_path = dir.path().join("restored.db");
        let backups_dir = dir.path().join("backups");

        assert!(restore_backup(&blob, None, &restore_path, &backups_dir).is_err());
        assert!(restore_backup(&blob, Some("wrong-pw-123"), &restore_path, &backups_dir).is_err());

        restore_backup(&blob, Some("backup-pw-123"), &restore_path, &backups_dir).unwrap();
        assert_eq!(fs::read(&restore_path).unwrap(), b"sensitive bytes");
    }

    #[test]
    fn restoring_over_existing_file_copies_it_aside() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("vault.db");
        fs::write(&db_path, b"old contents").unwrap();

        let new_db = dir.path().join("source.db");
        fs::write(&new_db, b"new contents").unwrap();
        let blob = create_backup(&new_db, None).unwrap();

        let backups_dir = dir.path().join("backups");
        restore_backup(&blob, None, &db_path, &backups_dir).unwrap();

        assert_eq!(fs::read(&db_path).unwrap(), b"new contents");
        let pre_restore_files: Vec<_> = fs::read_dir(&backups_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(pre_restore_files.len(), 1);
    }

    #[test]
    fn list_backups_sorted_newest_first() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("vault.db");
        fs::write(&db_path, b"x").unwrap();
        let backups_dir = dir.path().join("backups");
        fs::create_dir_all(&backups_dir).unwrap();

        for i in 0..3 {
            let blob = create_backup(&db_path, None).unwrap();
            fs::write(backups_dir.join(format!("vault-backup-{i}.enc")), blob).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let listed = list_backups(&backups_dir).unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed[0].1.created_at >= listed[1].1.created_at);
        assert!(listed[1].1.created_at >= listed[2].1.created_at);
    }

    #[test]
    fn malformed_backup_is_rejected() {
        let dir = TempDir::new().unwrap();
        let restore_path = dir.path().join("restored.db");
        let backups_dir = dir.path().join("backups");
        assert!(restore_backup(&[0xFF, 1, 2, 3], None, &restore_path, &backups_dir).is_err());
        assert!(restore_backup(&[], None, &restore_path, &backups_dir).is_err());
    }
}
