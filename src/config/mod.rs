//! Layered configuration, loaded from `~/.secrets/config.toml`.
//!
//! Every field has a sensible default so the vault works out-of-the-box
//! without any config file at all. A path can be overridden with the
//! `ENVLOCK_CONFIG` environment variable — handy for tests and CI.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::PBKDF2_ITERATIONS;
use crate::errors::{Result, VaultError};

const CONFIG_ENV_VAR: &str = "ENVLOCK_CONFIG";
const CONFIG_DIR_NAME: &str = ".secrets";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "vault.db";

/// Runtime configuration for the vault engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Minutes of inactivity before the vault auto-locks. `0` disables
    /// auto-lock entirely.
    #[serde(default = "default_auto_lock_timeout")]
    pub auto_lock_timeout_minutes: u64,

    /// Consecutive wrong-password attempts allowed before lockout.
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,

    /// How long a lockout lasts once triggered.
    #[serde(default = "default_lockout_duration_minutes")]
    pub lockout_duration_minutes: i64,

    /// How long a saved unlock session remains valid.
    #[serde(default = "default_session_timeout_minutes")]
    pub session_timeout_minutes: i64,

    /// PBKDF2 iteration count used when a *new* vault is initialized.
    /// Existing vaults keep whatever iteration count they were created
    /// with, recorded in their own metadata. Floored at the spec's
    /// minimum of 100,000 — this setting can only make new vaults
    /// slower to unlock, never weaker.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,
}

fn default_auto_lock_timeout() -> u64 {
    15
}

fn default_max_failed_attempts() -> u32 {
    3
}

fn default_lockout_duration_minutes() -> i64 {
    5
}

fn default_session_timeout_minutes() -> i64 {
    60
}

fn default_kdf_iterations() -> u32 {
    PBKDF2_ITERATIONS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_lock_timeout_minutes: default_auto_lock_timeout(),
            max_failed_attempts: default_max_failed_attempts(),
            lockout_duration_minutes: default_lockout_duration_minutes(),
            session_timeout_minutes: default_session_timeout_minutes(),
            kdf_iterations: default_kdf_iterations(),
        }
    }
}

impl Config {
    /// Load configuration, preferring `$ENVLOCK_CONFIG` over
    /// `~/.secrets/config.toml`. Missing files fall back to defaults;
    /// malformed ones are an error.
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => Self::load_from(Path::new(&path)),
            Err(_) => Self::load_from(&default_config_path()?),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| VaultError::ConfigError(format!("failed to parse {}: {e}", path.display())))?;

        if config.kdf_iterations < PBKDF2_ITERATIONS {
            config.kdf_iterations = PBKDF2_ITERATIONS;
        }
        if config.max_failed_attempts == 0 {
            config.max_failed_attempts = 1;
        }

        Ok(config)
    }

    pub fn auto_lock_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.auto_lock_timeout_minutes * 60)
    }

    /// Default location of the vault database: `~/.secrets/vault.db`.
    pub fn default_db_path() -> Result<PathBuf> {
        Ok(secrets_dir()?.join(DB_FILE_NAME))
    }
}

fn secrets_dir() -> Result<PathBuf> {
    let home = dirs_home()?;
    Ok(home.join(CONFIG_DIR_NAME))
}

fn default_config_path() -> Result<PathBuf> {
    Ok(secrets_dir()?.join(CONFIG_FILE_NAME))
}

/// Minimal home-directory lookup so we don't pull in a `dirs` crate for
/// one call: `$HOME` on Unix, `$USERPROFILE` on Windows.
fn dirs_home() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }
    if let Ok(profile) = std::env::var("USERPROFILE") {
        if !profile.is_empty() {
            return Ok(PathBuf::from(profile));
        }
    }
    Err(VaultError::ConfigError(
        "could not determine home directory".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let c = Config::default();
        assert_eq!(c.auto_lock_timeout_minutes, 15);
        assert_eq!(c.max_failed_attempts, 3);
        assert_eq!(c.lockout_duration_minutes, 5);
        assert_eq!(c.session_timeout_minutes, 60);
        assert_eq!(c.kdf_iterations, PBKDF2_ITERATIONS);
    }

    #[test]
    fn load_returns_defaults_when_missing() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load_from(&tmp.path().join("missing.toml")).unwrap();
        assert_eq!(config.auto_lock_timeout_minutes, 15);
    }

    #[test]
    fn load_parses_toml_and_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "max_failed_attempts = 5\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.max_failed_attempts, 5);
        assert_eq!(config.auto_lock_timeout_minutes, 15);
    }

    #[test]
    fn kdf_iterations_cannot_go_below_floor() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "kdf_iterations = 10\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.kdf_iterations, PBKDF2_ITERATIONS);
    }

    #[test]
    fn zero_failed_attempts_is_floored_to_one() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "max_failed_attempts = 0\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.max_failed_attempts, 1);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "not valid {{toml").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
