//! The vault engine — the state machine, crypto orchestration, and
//! secret CRUD tying together the store, session, and audit layers.

mod autolock;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::{debug, warn};

use crate::audit;
use crate::config::Config;
use crate::crypto::kdf::derive_master_key_with_iterations;
use crate::crypto::{self, MasterKey};
use crate::errors::{Result, VaultError};
use crate::model::{now_millis, AuditAction, Environment, Secret, VaultState};
use crate::store::projects::{self as project_rows, Project};
use crate::store::{secrets as secret_rows, Database};
use crate::validation;

const VERIFICATION_SENTINEL: &[u8] = b"secrets-manager-v1";

const META_SALT: &str = "salt";
const META_VERSION: &str = "version";
const META_CREATED_AT: &str = "created_at";
const META_AUTO_LOCK_TIMEOUT: &str = "auto_lock_timeout";
const META_VERIFIER: &str = "__vault_verification__";
const META_FAILED_ATTEMPTS: &str = "failed_attempts";
const META_LOCKOUT_UNTIL: &str = "lockout_until";
const META_KDF_ITERATIONS: &str = "kdf_iterations";

/// A fully-decrypted secret, returned by operations that reveal
/// plaintext (`get_secret_with_details`, `get_secrets_for_sync`).
#[derive(Debug, Clone)]
pub struct RevealedSecret {
    pub id: String,
    pub key: String,
    pub plaintext: String,
    pub environment: Environment,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_used_at: Option<i64>,
    pub expires_at: Option<i64>,
}

struct EngineInner {
    db: Database,
    db_path: PathBuf,
    state: VaultState,
    master_key: Option<MasterKey>,
    last_activity: Instant,
    auto_lock_timeout: std::time::Duration,
    generation: u64,
}

/// Handle to a single vault database.
///
/// Cloning is cheap — the handle is `Arc<Mutex<_>>` internally — which
/// is how the auto-lock timer observes state without keeping the
/// engine alive by itself (it only ever holds a `Weak` reference).
#[derive(Clone)]
pub struct VaultEngine {
    inner: Arc<Mutex<EngineInner>>,
    config: Config,
}

impl VaultEngine {
    /// Open a handle bound to `db_path`. The database file is created
    /// if missing; that alone does not make the vault `initialized` —
    /// the verifier sentinel in `vault_meta` does.
    pub fn open(db_path: &Path, config: Config) -> Result<Self> {
        let db = Database::open(db_path)?;
        let state = resolve_state(&db)?;

        let inner = EngineInner {
            db,
            db_path: db_path.to_path_buf(),
            state,
            master_key: None,
            last_activity: Instant::now(),
            auto_lock_timeout: config.auto_lock_timeout(),
            generation: 0,
        };

        Ok(Self {
            inner: Arc::new(Mutex::new(inner)),
            config,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.inner.lock().unwrap().db_path.clone()
    }

    pub fn is_initialized(&self) -> bool {
        !matches!(self.get_state(), VaultState::NotInitialized)
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.get_state(), VaultState::Locked | VaultState::LockedOut)
    }

    pub fn get_state(&self) -> VaultState {
        let inner = self.inner.lock().unwrap();
        if inner.master_key.is_some() {
            return VaultState::Unlocked;
        }
        resolve_state(&inner.db).unwrap_or(VaultState::Locked)
    }

    /// Initialize a brand-new vault. With `force`, re-initializes an
    /// already-initialized database — every previously stored secret
    /// becomes permanently undecryptable once the sentinel is replaced.
    pub fn initialize(&self, password: &str, force: bool) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();

        let already_initialized = inner.db.get_meta(META_VERIFIER)?.is_some();
        if already_initialized && !force {
            return Err(VaultError::VaultAlreadyInitialized(inner.db_path.clone()));
        }

        validation::validate_password(password)?;

        let salt = crypto::generate_salt();
        let iterations = self.config.kdf_iterations;
        let key_bytes = derive_master_key_with_iterations(password.as_bytes(), &salt, iterations)?;
        let sentinel = crypto::encrypt(&key_bytes, VERIFICATION_SENTINEL)?;
        let now = now_millis();

        inner.db.set_meta(META_SALT, &BASE64.encode(salt))?;
        inner.db.set_meta(META_VERSION, crate::store::SCHEMA_VERSION)?;
        inner.db.set_meta(META_CREATED_AT, &now.to_string())?;
        inner.db.set_meta(
            META_AUTO_LOCK_TIMEOUT,
            &self.config.auto_lock_timeout_minutes.to_string(),
        )?;
        inner.db.set_meta(META_VERIFIER, &sentinel)?;
        inner.db.set_meta(META_KDF_ITERATIONS, &iterations.to_string())?;
        inner.db.set_meta(META_FAILED_ATTEMPTS, "0")?;
        inner.db.set_meta(META_LOCKOUT_UNTIL, "")?;

        inner.master_key = Some(MasterKey::new(key_bytes));
        inner.state = VaultState::Unlocked;
        inner.last_activity = Instant::now();
        inner.generation += 1;
        let generation = inner.generation;

        debug!(path = %inner.db_path.display(), "vault initialized");
        drop(inner);
        self.arm_auto_lock(generation);
        Ok(())
    }

    /// Attempt to unlock with `password`. `timeout_override`, if given,
    /// replaces the persisted `auto_lock_timeout` for this session.
    pub fn unlock(&self, password: &str, timeout_override: Option<std::time::Duration>) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();

        let verifier = inner
            .db
            .get_meta(META_VERIFIER)?
            .ok_or_else(|| VaultError::VaultNotInitialized(inner.db_path.clone()))?;

        if let Some(until) = persisted_lockout(&inner.db)? {
            if until > now_millis() {
                let seconds_remaining = (until - now_millis()) / 1000;
                return Err(VaultError::LockedOut { seconds_remaining });
            }
            // Window elapsed: clear persisted lockout before proceeding.
            inner.db.set_meta(META_LOCKOUT_UNTIL, "")?;
            inner.db.set_meta(META_FAILED_ATTEMPTS, "0")?;
        }

        let salt = persisted_salt(&inner.db)?;
        let iterations = persisted_iterations(&inner.db)?;
        let candidate_key = derive_master_key_with_iterations(password.as_bytes(), &salt, iterations)?;

        if !crypto::verify_password(&candidate_key, VERIFICATION_SENTINEL, &verifier) {
            let max_attempts = self.config.max_failed_attempts;
            let lockout_minutes = self.config.lockout_duration_minutes;
            let attempts = persisted_failed_attempts(&inner.db)? + 1;
            inner.db.set_meta(META_FAILED_ATTEMPTS, &attempts.to_string())?;

            if attempts >= max_attempts {
                let until = now_millis() + lockout_minutes * 60_000;
                inner.db.set_meta(META_LOCKOUT_UNTIL, &until.to_string())?;
                inner.state = VaultState::LockedOut;
                warn!("vault locked out after {attempts} failed attempts");
                return Err(VaultError::LockedOut {
                    seconds_remaining: lockout_minutes * 60,
                });
            }

            return Err(VaultError::WrongPassword {
                attempts_remaining: max_attempts - attempts,
            });
        }

        inner.db.set_meta(META_FAILED_ATTEMPTS, "0")?;
        inner.db.set_meta(META_LOCKOUT_UNTIL, "")?;

        if let Some(timeout) = timeout_override {
            inner.auto_lock_timeout = timeout;
        } else {
            inner.auto_lock_timeout = persisted_auto_lock_timeout(&inner.db)?;
        }

        inner.master_key = Some(MasterKey::new(candidate_key));
        inner.state = VaultState::Unlocked;
        inner.last_activity = Instant::now();
        inner.generation += 1;
        let generation = inner.generation;

        debug!("vault unlocked");
        drop(inner);
        self.arm_auto_lock(generation);
        Ok(())
    }

    /// Disarm the timer, zeroize the master key, and transition to
    /// `LOCKED`. Idempotent.
    pub fn lock(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.master_key = None;
        inner.generation += 1;
        if inner.state == VaultState::Unlocked {
            inner.state = VaultState::Locked;
        }
        debug!("vault locked");
    }

    /// Unlock using an already-derived master key, e.g. one restored
    /// from the session cache, instead of re-deriving from a password.
    /// Verifies the key against the stored sentinel before accepting it.
    pub fn unlock_with_key(&self, key: MasterKey, timeout_override: Option<std::time::Duration>) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();

        let verifier = inner
            .db
            .get_meta(META_VERIFIER)?
            .ok_or_else(|| VaultError::VaultNotInitialized(inner.db_path.clone()))?;

        if !crypto::verify_password(key.as_bytes(), VERIFICATION_SENTINEL, &verifier) {
            return Err(VaultError::SessionInvalid(
                "session key does not match this vault".into(),
            ));
        }

        if let Some(timeout) = timeout_override {
            inner.auto_lock_timeout = timeout;
        } else {
            inner.auto_lock_timeout = persisted_auto_lock_timeout(&inner.db)?;
        }

        inner.master_key = Some(key);
        inner.state = VaultState::Unlocked;
        inner.last_activity = Instant::now();
        inner.generation += 1;
        let generation = inner.generation;

        debug!("vault unlocked via session key");
        drop(inner);
        self.arm_auto_lock(generation);
        Ok(())
    }

    /// The current master key, for callers that want to cache it in the
    /// session file. `None` unless the vault is currently `UNLOCKED`.
    pub fn current_master_key(&self) -> Option<MasterKey> {
        let inner = self.inner.lock().unwrap();
        inner.master_key.as_ref().map(|k| MasterKey::new(*k.as_bytes()))
    }

    fn arm_auto_lock(&self, generation: u64) {
        autolock::spawn(Arc::downgrade(&self.inner), generation);
    }

    fn require_unlocked<'a>(&self, inner: &'a mut EngineInner) -> Result<&'a MasterKey> {
        inner.last_activity = Instant::now();
        match inner.state {
            VaultState::Unlocked => inner.master_key.as_ref().ok_or(VaultError::VaultLocked),
            _ => Err(VaultError::VaultLocked),
        }
    }

    pub fn add_secret(
        &self,
        key: &str,
        value: &str,
        environment: Environment,
        description: Option<&str>,
        tags: Vec<String>,
        expires_at: Option<i64>,
    ) -> Result<Secret> {
        validation::validate_secret_key(key)?;
        validation::validate_secret_value(value)?;

        let mut inner = self.inner.lock().unwrap();
        let key_bytes = *self.require_unlocked(&mut *inner)?.as_bytes();

        if secret_rows::find_exact(inner.db.connection(), key, environment)?.is_some() {
            return Err(VaultError::SecretAlreadyExists(key.to_string()));
        }

        let ciphertext = crypto::encrypt(&key_bytes, value.as_bytes())?;
        let now = now_millis();
        let secret = Secret {
            id: uuid::Uuid::new_v4().to_string(),
            key: key.to_string(),
            value: ciphertext,
            environment,
            description: description.map(str::to_string),
            tags,
            created_at: now,
            updated_at: now,
            last_used_at: None,
            expires_at,
        };

        secret_rows::insert(inner.db.connection(), &secret)?;
        audit::record(
            inner.db.connection(),
            AuditAction::Write,
            Some(key),
            Some(environment),
            None,
        )?;

        Ok(secret)
    }

    /// Look up `(key, environment)`, falling back to `(key, 'all')`
    /// when the exact row is absent and `environment != All`.
    pub fn get_secret(&self, key: &str, environment: Environment) -> Result<Option<String>> {
        let mut inner = self.inner.lock().unwrap();
        let key_bytes = *self.require_unlocked(&mut *inner)?.as_bytes();

        let row = match secret_rows::find_exact(inner.db.connection(), key, environment)? {
            Some(row) => Some(row),
            None if environment != Environment::All => {
                secret_rows::find_exact(inner.db.connection(), key, Environment::All)?
            }
            None => None,
        };

        let Some(row) = row else {
            return Ok(None);
        };

        let plaintext = decrypt_to_string(&key_bytes, &row.value)?;
        secret_rows::touch_last_used(inner.db.connection(), &row.id, now_millis())?;
        audit::record(
            inner.db.connection(),
            AuditAction::Read,
            Some(key),
            Some(row.environment),
            None,
        )?;

        Ok(Some(plaintext))
    }

    /// Same lookup rule as `get_secret`, returning the full record.
    /// The audit entry's environment is the *matched* row's, which may
    /// differ from the one requested (the `'all'` fallback).
    pub fn get_secret_with_details(
        &self,
        key: &str,
        environment: Environment,
    ) -> Result<Option<RevealedSecret>> {
        let mut inner = self.inner.lock().unwrap();
        let key_bytes = *self.require_unlocked(&mut *inner)?.as_bytes();

        let row = match secret_rows::find_exact(inner.db.connection(), key, environment)? {
            Some(row) => Some(row),
            None if environment != Environment::All => {
                secret_rows::find_exact(inner.db.connection(), key, Environment::All)?
            }
            None => None,
        };

        let Some(row) = row else {
            return Ok(None);
        };

        let plaintext = decrypt_to_string(&key_bytes, &row.value)?;
        let now = now_millis();
        secret_rows::touch_last_used(inner.db.connection(), &row.id, now)?;
        audit::record(
            inner.db.connection(),
            AuditAction::Read,
            Some(key),
            Some(row.environment),
            None,
        )?;

        Ok(Some(RevealedSecret {
            id: row.id,
            key: row.key,
            plaintext,
            environment: row.environment,
            description: row.description,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_used_at: Some(now),
            expires_at: row.expires_at,
        }))
    }

    /// List secret metadata (ciphertext stays ciphertext; no
    /// decryption happens here), optionally filtered to one
    /// environment plus its `'all'` fallbacks.
    pub fn list_secrets(&self, environment: Option<Environment>) -> Result<Vec<Secret>> {
        let mut inner = self.inner.lock().unwrap();
        self.require_unlocked(&mut *inner)?;
        secret_rows::list(inner.db.connection(), environment)
    }

    pub fn update_secret(
        &self,
        key: &str,
        value: &str,
        environment: Environment,
        description: Option<&str>,
        tags: Option<Vec<String>>,
    ) -> Result<()> {
        validation::validate_secret_value(value)?;

        let mut inner = self.inner.lock().unwrap();
        let key_bytes = *self.require_unlocked(&mut *inner)?.as_bytes();

        if secret_rows::find_exact(inner.db.connection(), key, environment)?.is_none() {
            return Err(VaultError::SecretNotFound(key.to_string()));
        }

        let ciphertext = crypto::encrypt(&key_bytes, value.as_bytes())?;
        secret_rows::update_value(
            inner.db.connection(),
            key,
            environment,
            &ciphertext,
            description,
            tags.as_deref(),
            now_millis(),
        )?;
        audit::record(
            inner.db.connection(),
            AuditAction::Write,
            Some(key),
            Some(environment),
            None,
        )?;

        Ok(())
    }

    pub fn delete_secret(&self, key: &str, environment: Environment) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        self.require_unlocked(&mut *inner)?;

        let removed = secret_rows::delete_exact(inner.db.connection(), key, environment)?;
        if removed == 0 {
            return Err(VaultError::SecretNotFound(key.to_string()));
        }

        audit::record(
            inner.db.connection(),
            AuditAction::Delete,
            Some(key),
            Some(environment),
            None,
        )?;
        Ok(())
    }

    /// Deletes every environment's row for `key`. Unlike `delete_secret`,
    /// succeeds silently (returning 0) if nothing matched.
    pub fn delete_secret_all_envs(&self, key: &str) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        self.require_unlocked(&mut *inner)?;

        let removed = secret_rows::delete_all_environments(inner.db.connection(), key)?;
        if removed > 0 {
            audit::record(inner.db.connection(), AuditAction::Delete, Some(key), None, None)?;
        }
        Ok(removed)
    }

    /// Re-encrypts `new_value` for every row matching `key` whose
    /// environment is not in `exclude`. Each row gets its own fresh
    /// AEAD call (its own nonce) rather than one ciphertext copied
    /// across rows — see DESIGN.md for why this departs from a literal
    /// reading of "encrypt once, reuse the ciphertext".
    pub fn rotate_secret(&self, key: &str, new_value: &str, exclude: &[Environment]) -> Result<usize> {
        validation::validate_secret_value(new_value)?;

        let mut inner = self.inner.lock().unwrap();
        let key_bytes = *self.require_unlocked(&mut *inner)?.as_bytes();

        let rows: Vec<Secret> = secret_rows::find_all_environments(inner.db.connection(), key)?
            .into_iter()
            .filter(|row| !exclude.contains(&row.environment))
            .collect();

        if rows.is_empty() {
            return Err(VaultError::SecretNotFound(key.to_string()));
        }

        let now = now_millis();
        for row in &rows {
            let ciphertext = crypto::encrypt(&key_bytes, new_value.as_bytes())?;
            secret_rows::update_value_by_id(inner.db.connection(), &row.id, &ciphertext, now)?;
            audit::record(
                inner.db.connection(),
                AuditAction::Rotate,
                Some(key),
                Some(row.environment),
                None,
            )?;
        }

        Ok(rows.len())
    }

    pub fn search_secrets(&self, substring: &str) -> Result<Vec<Secret>> {
        let mut inner = self.inner.lock().unwrap();
        self.require_unlocked(&mut *inner)?;
        secret_rows::search(inner.db.connection(), substring)
    }

    /// Decrypt every stored secret, across every environment — used by
    /// the export codec. Unlike `get_secrets_for_sync`, no merge rule
    /// is applied: every row is returned individually.
    pub fn export_all(&self) -> Result<Vec<RevealedSecret>> {
        let mut inner = self.inner.lock().unwrap();
        let key_bytes = *self.require_unlocked(&mut *inner)?.as_bytes();

        let rows = secret_rows::list(inner.db.connection(), None)?;
        rows.into_iter()
            .map(|row| {
                let plaintext = decrypt_to_string(&key_bytes, &row.value)?;
                Ok(RevealedSecret {
                    id: row.id,
                    key: row.key,
                    plaintext,
                    environment: row.environment,
                    description: row.description,
                    tags: row.tags,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                    last_used_at: row.last_used_at,
                    expires_at: row.expires_at,
                })
            })
            .collect()
    }

    /// Query the persisted audit log. Unlike secret operations, this
    /// does not require the vault to be `UNLOCKED` — audit rows carry
    /// no secret plaintext.
    pub fn get_audit_logs(&self, filter: &audit::LogFilter<'_>) -> Result<Vec<crate::model::AuditEntry>> {
        let inner = self.inner.lock().unwrap();
        audit::get_logs(inner.db.connection(), filter)
    }

    /// Registers `path` as a project root, or returns the existing
    /// registration if one is already there. Does not require the
    /// vault to be unlocked: project rows carry no secret plaintext.
    pub fn register_project(&self, name: &str, path: &str) -> Result<Project> {
        let inner = self.inner.lock().unwrap();
        if let Some(existing) = project_rows::find_by_path(inner.db.connection(), path)? {
            return Ok(existing);
        }
        let project = Project {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            path: path.to_string(),
            created_at: now_millis(),
            last_synced_at: None,
        };
        project_rows::insert(inner.db.connection(), &project)?;
        Ok(project)
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let inner = self.inner.lock().unwrap();
        project_rows::list(inner.db.connection())
    }

    /// Merge rule: the environment-specific row wins over `'all'`.
    pub fn get_secrets_for_sync(&self, environment: Environment) -> Result<HashMap<String, String>> {
        let mut inner = self.inner.lock().unwrap();
        let key_bytes = *self.require_unlocked(&mut *inner)?.as_bytes();

        let mut merged: HashMap<String, Secret> = HashMap::new();
        for row in secret_rows::list(inner.db.connection(), Some(Environment::All))? {
            if row.environment == environment || row.environment == Environment::All {
                let should_insert = match merged.get(&row.key) {
                    Some(existing) => existing.environment == Environment::All && row.environment != Environment::All,
                    None => true,
                };
                if should_insert {
                    merged.insert(row.key.clone(), row);
                }
            }
        }

        let mut out = HashMap::with_capacity(merged.len());
        for (k, row) in merged {
            out.insert(k, decrypt_to_string(&key_bytes, &row.value)?);
        }
        Ok(out)
    }

    /// Re-keys every secret row under a freshly derived master key.
    /// Aborts (leaving the database untouched) if any row fails to
    /// decrypt under the old key.
    pub fn change_master_password(&self, old_password: &str, new_password: &str) -> Result<()> {
        validation::validate_password(new_password)?;

        let mut inner = self.inner.lock().unwrap();
        let was_unlocked = inner.state == VaultState::Unlocked;

        let verifier = inner
            .db
            .get_meta(META_VERIFIER)?
            .ok_or_else(|| VaultError::VaultNotInitialized(inner.db_path.clone()))?;
        let old_salt = persisted_salt(&inner.db)?;
        let old_iterations = persisted_iterations(&inner.db)?;
        let old_key = derive_master_key_with_iterations(old_password.as_bytes(), &old_salt, old_iterations)?;

        if !crypto::verify_password(&old_key, VERIFICATION_SENTINEL, &verifier) {
            return Err(VaultError::WrongPassword {
                attempts_remaining: self.config.max_failed_attempts,
            });
        }

        let new_salt = crypto::generate_salt();
        let new_iterations = self.config.kdf_iterations;
        let new_key = derive_master_key_with_iterations(new_password.as_bytes(), &new_salt, new_iterations)?;

        let all_rows = secret_rows::list(inner.db.connection(), None)?;
        let mut decrypted = Vec::with_capacity(all_rows.len());
        for row in &all_rows {
            let plaintext = crypto::decrypt(&old_key, &row.value)
                .map_err(|_| VaultError::VaultCorrupted(format!("row {} undecryptable under old key", row.id)))?;
            decrypted.push((row.id.clone(), plaintext));
        }

        let conn = inner.db.connection_mut();
        let tx = conn.transaction()?;
        for (id, plaintext) in &decrypted {
            let ciphertext = crypto::encrypt(&new_key, plaintext)?;
            tx.execute(
                "UPDATE secrets SET value = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![ciphertext, now_millis(), id],
            )?;
        }
        let new_sentinel = crypto::encrypt(&new_key, VERIFICATION_SENTINEL)?;
        tx.execute(
            "INSERT INTO vault_meta (key, value) VALUES ('salt', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![BASE64.encode(new_salt)],
        )?;
        tx.execute(
            "INSERT INTO vault_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![META_VERIFIER, new_sentinel],
        )?;
        tx.execute(
            "INSERT INTO vault_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![META_KDF_ITERATIONS, new_iterations.to_string()],
        )?;
        tx.commit()?;

        drop(inner);

        if was_unlocked {
            self.lock();
            self.unlock(new_password, None)?;
        }

        Ok(())
    }
}

fn decrypt_to_string(key: &[u8], ciphertext: &str) -> Result<String> {
    let bytes = crypto::decrypt(key, ciphertext)?;
    String::from_utf8(bytes).map_err(|_| VaultError::DecryptionFailed)
}

fn resolve_state(db: &Database) -> Result<VaultState> {
    if db.get_meta(META_VERIFIER)?.is_none() {
        return Ok(VaultState::NotInitialized);
    }
    match persisted_lockout(db)? {
        Some(until) if until > now_millis() => Ok(VaultState::LockedOut),
        _ => Ok(VaultState::Locked),
    }
}

fn persisted_lockout(db: &Database) -> Result<Option<i64>> {
    match db.get_meta(META_LOCKOUT_UNTIL)? {
        Some(raw) if !raw.is_empty() => Ok(raw.parse().ok()),
        _ => Ok(None),
    }
}

fn persisted_salt(db: &Database) -> Result<Vec<u8>> {
    let raw = db
        .get_meta(META_SALT)?
        .ok_or_else(|| VaultError::VaultCorrupted("missing salt".into()))?;
    BASE64
        .decode(raw)
        .map_err(|e| VaultError::VaultCorrupted(format!("malformed salt: {e}")))
}

fn persisted_iterations(db: &Database) -> Result<u32> {
    match db.get_meta(META_KDF_ITERATIONS)? {
        Some(raw) => raw
            .parse()
            .map_err(|_| VaultError::VaultCorrupted("malformed kdf_iterations".into())),
        None => Ok(crate::crypto::kdf::PBKDF2_ITERATIONS),
    }
}

fn persisted_failed_attempts(db: &Database) -> Result<u32> {
    match db.get_meta(META_FAILED_ATTEMPTS)? {
        Some(raw) => Ok(raw.parse().unwrap_or(0)),
        None => Ok(0),
    }
}

fn persisted_auto_lock_timeout(db: &Database) -> Result<std::time::Duration> {
    let minutes: u64 = match db.get_meta(META_AUTO_LOCK_TIMEOUT)? {
        Some(raw) => raw.parse().unwrap_or(15),
        None => 15,
    };
    Ok(std::time::Duration::from_secs(minutes * 60))
}
