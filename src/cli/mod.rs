//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Config;
use crate::engine::VaultEngine;
use crate::errors::{Result, VaultError};
use crate::session::SessionCache;

/// envlock CLI: a local-first, encrypted vault for developer credentials.
#[derive(Parser)]
#[command(name = "envlock", about = "Local-first encrypted secrets vault", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the vault database path (default: ~/.secrets/vault.db)
    #[arg(long, global = true)]
    pub db_path: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Initialize a new vault
    Init,

    /// Add a new secret (fails if it already exists for this environment)
    Add {
        /// Secret name, e.g. DATABASE_URL
        key: String,
        /// Secret value (omit for interactive prompt)
        value: Option<String>,
        /// Environment: dev, staging, prod, or all (default: all)
        #[arg(short, long, default_value = "all")]
        env: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Get a secret's value
    Get {
        key: String,
        #[arg(short, long, default_value = "all")]
        env: String,
    },

    /// List secrets (metadata only, no values)
    List {
        /// Restrict to one environment
        #[arg(short, long)]
        env: Option<String>,
    },

    /// Update an existing secret's value
    Update {
        key: String,
        value: Option<String>,
        #[arg(short, long, default_value = "all")]
        env: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a secret
    #[command(alias = "rm", alias = "remove")]
    Delete {
        key: String,
        /// Delete in one environment only (default: every environment)
        #[arg(short, long)]
        env: Option<String>,
        #[arg(short, long)]
        force: bool,
    },

    /// Re-encrypt a secret's value, optionally excluding environments
    Rotate {
        key: String,
        value: Option<String>,
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,
    },

    /// Lock the vault, discarding the in-memory master key
    Lock,

    /// Unlock the vault for this and subsequent commands
    Unlock,

    /// Change the vault's master password
    ChangePassword,

    /// Print the merged secrets for an environment as KEY=VALUE lines
    Sync {
        #[arg(short, long, default_value = "dev")]
        env: String,
    },

    /// Run a command with secrets injected as environment variables
    Run {
        #[arg(short, long, default_value = "dev")]
        env: String,
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// View the audit log
    Audit {
        #[arg(long)]
        key: Option<String>,
        #[arg(long, default_value = "50")]
        last: i64,
    },

    /// Report the vault's current state and lockout status
    Health,

    /// Write an encrypted snapshot of the whole vault database
    Backup {
        /// Output file (default: ~/.secrets/backups/vault-backup-<ms>.enc)
        #[arg(short, long)]
        output: Option<String>,
        /// Encrypt the backup with a separate backup password
        #[arg(long)]
        encrypt: bool,
    },

    /// Restore the vault database from a backup file
    Restore {
        file: String,
        #[arg(long)]
        encrypted: bool,
    },

    /// Export secrets to a portable encrypted bundle
    Export { output: String },

    /// Import secrets from a portable encrypted bundle
    Import { file: String },

    /// Manage linked project directories
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },
}

/// Project subcommands.
#[derive(clap::Subcommand)]
pub enum ProjectAction {
    /// Register the current directory as a project
    Init {
        /// Project name (default: directory name)
        name: Option<String>,
    },

    /// List registered projects
    List,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the database path: `--db-path` if given, else the config
/// default (`~/.secrets/vault.db`).
pub fn db_path(cli: &Cli, config: &Config) -> Result<PathBuf> {
    match &cli.db_path {
        Some(p) => Ok(PathBuf::from(p)),
        None => config.default_db_path(),
    }
}

fn session_path(db_path: &Path) -> PathBuf {
    db_path
        .parent()
        .map(|p| p.join("session.json"))
        .unwrap_or_else(|| PathBuf::from("session.json"))
}

/// Open the engine and unlock it, in order of preference:
/// 1. A still-valid session cache (no prompt).
/// 2. The `ENVLOCK_PASSWORD` environment variable (CI/CD friendly).
/// 3. An interactive password prompt.
///
/// On a fresh password unlock, saves the resulting master key back to
/// the session cache so the next invocation in this session skips the
/// prompt.
pub fn open_unlocked(cli: &Cli) -> Result<VaultEngine> {
    let config = Config::load()?;
    let path = db_path(cli, &config)?;
    let engine = VaultEngine::open(&path, config.clone())?;

    if !engine.is_initialized() {
        return Err(VaultError::VaultNotInitialized(path));
    }

    let cache = SessionCache::new(session_path(&path));
    if engine.is_locked() {
        if let Some(key) = cache.load_session()? {
            if engine.unlock_with_key(key, None).is_ok() {
                return Ok(engine);
            }
        }

        let password = prompt_password()?;
        engine.unlock(&password, None)?;
        if let Some(key) = engine.current_master_key() {
            let _ = cache.save_session(&key, config.session_timeout_minutes);
        }
    }

    Ok(engine)
}

/// Open the engine without requiring it be unlocked — used by `init`,
/// `lock`, `unlock`, and `health`.
pub fn open_engine(cli: &Cli) -> Result<(VaultEngine, Config)> {
    let config = Config::load()?;
    let path = db_path(cli, &config)?;
    let engine = VaultEngine::open(&path, config.clone())?;
    Ok((engine, config))
}

/// Read the vault password, preferring `ENVLOCK_PASSWORD` over an
/// interactive prompt. Returns `Zeroizing<String>` so it is wiped on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("ENVLOCK_PASSWORD") {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter vault password")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation, used by `init` and
/// `change-password`. Also honors `ENVLOCK_PASSWORD` for scripted use.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("ENVLOCK_PASSWORD") {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let password = dialoguer::Password::new()
        .with_prompt("Choose a new vault password")
        .with_confirmation("Confirm vault password", "Passwords do not match, try again")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;

    Ok(Zeroizing::new(password))
}

/// Prompt for a password with confirmation, honoring `env_var` first —
/// used by `export`/`backup` (their own password, independent of the
/// vault's master password) for the same scripted-unlock story as
/// `prompt_new_password`.
pub fn prompt_password_with_confirmation(
    prompt: &str,
    confirm_prompt: &str,
    env_var: &str,
) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(env_var) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let password = dialoguer::Password::new()
        .with_prompt(prompt)
        .with_confirmation(confirm_prompt, "Passwords do not match, try again")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;

    Ok(Zeroizing::new(password))
}

/// Prompt for a password honoring `env_var` first, without confirmation
/// — used to decrypt an existing `export`/`backup` bundle.
pub fn prompt_password_for(prompt: &str, env_var: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(env_var) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Forget any cached session for this vault — called by `lock`.
pub fn clear_session(db_path: &Path) {
    let cache = SessionCache::new(session_path(db_path));
    let _ = cache.delete_session();
}
