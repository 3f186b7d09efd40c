//! Session cache — a short-lived, on-disk copy of the master key.
//!
//! Lets a CLI process unlock once and have later invocations within
//! the same terminal session skip the password prompt, without ever
//! writing the master key to disk in the clear. The session key that
//! protects it sits right next to the ciphertext, so anyone who can
//! read this file can recover the master key — see the module-level
//! security note in the spec this mirrors; the threat model is
//! "convenience in one interactive session", not a hardened secret
//! store in its own right.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::crypto::{self, MasterKey};
use crate::errors::Result;
use crate::model::now_millis;

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    encrypted_master_key: String,
    session_key: String,
    expires_at: i64,
    created_at: i64,
}

pub struct SessionCache {
    path: PathBuf,
}

impl SessionCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Encrypt `master_key` under a freshly generated session key and
    /// write it to disk with `0o600` permissions.
    pub fn save_session(&self, master_key: &MasterKey, timeout_minutes: i64) -> Result<()> {
        let mut session_key = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut session_key);

        let encrypted_master_key = crypto::encrypt(&session_key, master_key.as_bytes())?;
        let now = now_millis();

        let file = SessionFile {
            encrypted_master_key,
            session_key: BASE64.encode(session_key),
            expires_at: now + timeout_minutes * 60_000,
            created_at: now,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string(&file)
            .map_err(|e| crate::errors::VaultError::SerializationError(e.to_string()))?;
        fs::write(&self.path, json)?;
        set_file_permissions(&self.path);

        Ok(())
    }

    /// Load and decrypt the cached master key. Returns `None` — and
    /// deletes the file — on expiry, a missing file, or any
    /// parse/AEAD failure; all of those are "no valid session" to the
    /// caller, who should fall back to prompting.
    pub fn load_session(&self) -> Result<Option<MasterKey>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return Ok(None),
        };

        let parsed: Option<SessionFile> = serde_json::from_str(&contents).ok();
        let Some(file) = parsed else {
            let _ = self.delete_session();
            return Ok(None);
        };

        if now_millis() > file.expires_at {
            let _ = self.delete_session();
            return Ok(None);
        }

        let session_key = match BASE64.decode(&file.session_key) {
            Ok(bytes) if bytes.len() == 32 => bytes,
            _ => {
                let _ = self.delete_session();
                return Ok(None);
            }
        };

        match crypto::decrypt(&session_key, &file.encrypted_master_key) {
            Ok(bytes) if bytes.len() == 32 => {
                let mut key = [0u8; 32];
                key.copy_from_slice(&bytes);
                Ok(Some(MasterKey::new(key)))
            }
            _ => {
                let _ = self.delete_session();
                Ok(None)
            }
        }
    }

    /// Push the expiry out by `timeout_minutes` from now, preserving
    /// the cached key. Returns `false` if there was no valid session
    /// to extend.
    pub fn extend_session(&self, timeout_minutes: i64) -> Result<bool> {
        let Some(master_key) = self.load_session()? else {
            return Ok(false);
        };
        self.save_session(&master_key, timeout_minutes)?;
        Ok(true)
    }

    pub fn has_valid_session(&self) -> bool {
        matches!(self.load_session(), Ok(Some(_)))
    }

    /// Zero-fill the file's bytes before removing it, to frustrate
    /// casual inspection of a deleted-but-unscrubbed inode.
    pub fn delete_session(&self) -> Result<()> {
        if let Ok(metadata) = fs::metadata(&self.path) {
            let zeros = vec![0u8; metadata.len() as usize];
            let _ = fs::write(&self.path, zeros);
        }
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
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

    fn key(byte: u8) -> MasterKey {
        MasterKey::new([byte; 32])
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let cache = SessionCache::new(dir.path().join("session.json"));

        cache.save_session(&key(7), 60).unwrap();
        let loaded = cache.load_session().unwrap().unwrap();
        assert_eq!(loaded.as_bytes(), &[7u8; 32]);
    }

    #[test]
    fn load_returns_none_when_missing() {
        let dir = TempDir::new().unwrap();
        let cache = SessionCache::new(dir.path().join("session.json"));
        assert!(cache.load_session().unwrap().is_none());
    }

    #[test]
    fn expired_session_is_deleted_and_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let cache = SessionCache::new(path.clone());

        cache.save_session(&key(1), -1).unwrap(); // already expired
        assert!(cache.load_session().unwrap().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn extend_session_preserves_key_and_pushes_expiry() {
        let dir = TempDir::new().unwrap();
        let cache = SessionCache::new(dir.path().join("session.json"));

        cache.save_session(&key(3), 1).unwrap();
        assert!(cache.extend_session(60).unwrap());
        let loaded = cache.load_session().unwrap().unwrap();
        assert_eq!(loaded.as_bytes(), &[3u8; 32]);
    }

    #[test]
    fn extend_session_false_when_absent() {
        let dir = TempDir::new().unwrap();
        let cache = SessionCache::new(dir.path().join("session.json"));
        assert!(!cache.extend_session(60).unwrap());
    }

    #[test]
    fn delete_session_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let cache = SessionCache::new(dir.path().join("session.json"));
        cache.save_session(&key(9), 60).unwrap();
        cache.delete_session().unwrap();
        cache.delete_session().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn session_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let cache = SessionCache::new(path.clone());
        cache.save_session(&key(2), 60).unwrap();
        let perms = fs::metadata(&path).unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }
}
