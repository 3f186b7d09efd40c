//! Shared data types for secrets, environments, and audit actions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

/// The four logical partitions of the secret namespace.
///
/// `All` is both a label (secrets can be stored under it) and the
/// default fallback: a lookup for `Dev` that misses also checks `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
    All,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dev" => Ok(Self::Dev),
            "staging" => Ok(Self::Staging),
            "prod" => Ok(Self::Prod),
            "all" => Ok(Self::All),
            other => Err(VaultError::InvalidEnvironment(other.to_string())),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::All
    }
}

/// A stored secret. `value` holds the AEAD ciphertext (base64) except
/// where noted — `VaultEngine::get_secret` returns the decrypted
/// plaintext separately rather than mutating this struct in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Secret {
    pub id: String,
    pub key: String,
    pub value: String,
    pub environment: Environment,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_used_at: Option<i64>,
    pub expires_at: Option<i64>,
}

/// The action recorded for a single audit log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    Read,
    Write,
    Delete,
    Rotate,
    Export,
    Import,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
            Self::Rotate => "rotate",
            Self::Export => "export",
            Self::Import => "import",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "delete" => Ok(Self::Delete),
            "rotate" => Ok(Self::Rotate),
            "export" => Ok(Self::Export),
            "import" => Ok(Self::Import),
            other => Err(VaultError::AuditError(format!("unknown action '{other}'"))),
        }
    }
}

/// A single audit log entry, as read back from storage.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: i64,
    pub action: AuditAction,
    pub secret_key: Option<String>,
    pub environment: Option<Environment>,
    pub user: String,
    pub ip_address: Option<String>,
    pub metadata: Option<String>,
}

/// The vault engine's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    NotInitialized,
    Locked,
    Unlocked,
    LockedOut,
}

impl fmt::Display for VaultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::Locked => "LOCKED",
            Self::Unlocked => "UNLOCKED",
            Self::LockedOut => "LOCKED_OUT",
        };
        f.write_str(s)
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
