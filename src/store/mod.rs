//! Persistent store — SQLite-backed schema, metadata, and file permissions.
//!
//! `Database` wraps a single [`rusqlite::Connection`] with foreign keys
//! enabled and owns schema creation. Higher layers (`engine`, `audit`)
//! borrow the connection rather than talking to SQLite directly.

pub mod projects;
pub mod secrets;

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::errors::Result;

/// Current schema version string, stored in `vault_meta`.
pub const SCHEMA_VERSION: &str = "1";

const SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS vault_meta (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS secrets (
        id            TEXT PRIMARY KEY,
        key           TEXT NOT NULL,
        value         TEXT NOT NULL,
        environment   TEXT NOT NULL,
        description   TEXT,
        tags          TEXT,
        created_at    INTEGER NOT NULL,
        updated_at    INTEGER NOT NULL,
        last_used_at  INTEGER,
        expires_at    INTEGER,
        UNIQUE(key, environment)
    );
    CREATE INDEX IF NOT EXISTS idx_secrets_key ON secrets(key);
    CREATE INDEX IF NOT EXISTS idx_secrets_environment ON secrets(environment);
    CREATE INDEX IF NOT EXISTS idx_secrets_updated_at ON secrets(updated_at);
    CREATE INDEX IF NOT EXISTS idx_secrets_expires_at ON secrets(expires_at);

    CREATE TABLE IF NOT EXISTS projects (
        id              TEXT PRIMARY KEY,
        name            TEXT NOT NULL,
        path            TEXT NOT NULL UNIQUE,
        created_at      INTEGER NOT NULL,
        last_synced_at  INTEGER
    );

    CREATE TABLE IF NOT EXISTS project_secrets (
        project_id  TEXT NOT NULL,
        secret_id   TEXT NOT NULL,
        added_at    INTEGER NOT NULL,
        PRIMARY KEY (project_id, secret_id),
        FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE,
        FOREIGN KEY (secret_id) REFERENCES secrets(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS audit_logs (
        id            TEXT PRIMARY KEY,
        timestamp     INTEGER NOT NULL,
        action        TEXT NOT NULL,
        secret_key    TEXT,
        environment   TEXT,
        user          TEXT NOT NULL,
        ip_address    TEXT,
        metadata      TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_audit_logs_timestamp ON audit_logs(timestamp);
    CREATE INDEX IF NOT EXISTS idx_audit_logs_secret_key ON audit_logs(secret_key);
    CREATE INDEX IF NOT EXISTS idx_audit_logs_action ON audit_logs(action);
";

/// Handle to the vault's SQLite database.
pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    /// Open (creating if necessary) the database at `path`, enabling
    /// foreign keys and creating the schema if it is not present yet.
    ///
    /// Sets restrictive permissions on the database file and its
    /// parent directory; failures to do so (e.g. on platforms without
    /// Unix permission bits) are non-fatal.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
            set_dir_permissions(parent);
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA case_sensitive_like = ON;")?;
        conn.execute_batch(SCHEMA_SQL)?;

        set_file_permissions(path);

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fetch a metadata value by key.
    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM vault_meta WHERE key = ?1")?;
        let mut rows = stmt.query(rusqlite::params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Upsert a metadata key/value pair.
    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO vault_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }
}

/// Returns `true` if a file exists at `path`. Does not validate that
/// it is a well-formed vault database — callers that need that
/// guarantee should attempt to open it and handle `VaultCorrupted`.
pub fn vault_exists(path: &Path) -> bool {
    path.exists()
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) {}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o700));
}

#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) {}
