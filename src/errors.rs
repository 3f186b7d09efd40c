use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in the vault engine and its collaborators.
///
/// Every variant carries a stable `code()` string so that callers —
/// notably the CLI — can match on a wire-safe identifier instead of
/// parsing the `Display` message.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Lifecycle errors ---
    #[error("vault not initialized at {0}")]
    VaultNotInitialized(PathBuf),

    #[error("vault already initialized at {0}")]
    VaultAlreadyInitialized(PathBuf),

    #[error("vault is locked")]
    VaultLocked,

    #[error("wrong password ({attempts_remaining} attempt(s) remaining)")]
    WrongPassword { attempts_remaining: u32 },

    #[error("vault locked out for {seconds_remaining}s after too many failed attempts")]
    LockedOut { seconds_remaining: i64 },

    // --- Secret errors ---
    #[error("secret '{0}' not found")]
    SecretNotFound(String),

    #[error("secret '{0}' already exists")]
    SecretAlreadyExists(String),

    #[error("invalid secret key: {0}")]
    InvalidKey(String),

    #[error("invalid environment: {0}")]
    InvalidEnvironment(String),

    #[error("secret value exceeds the 64 KiB limit")]
    SecretValueTooLarge,

    // --- Password validation ---
    #[error("password does not meet strength requirements: {0:?}")]
    InvalidPassword(Vec<String>),

    // --- Crypto errors ---
    #[error("decryption failed — wrong password or corrupted data")]
    DecryptionFailed,

    #[error("key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Persistence errors ---
    #[error("vault corrupted: {0}")]
    VaultCorrupted(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerializationError(String),

    // --- Session errors ---
    #[error("session expired")]
    SessionExpired,

    #[error("session invalid: {0}")]
    SessionInvalid(String),

    // --- Backup / export errors ---
    #[error("invalid backup format: {0}")]
    InvalidBackupFormat(String),

    #[error("invalid export format: {0}")]
    InvalidExportFormat(String),

    // --- Config errors ---
    #[error("config error: {0}")]
    ConfigError(String),

    // --- CLI-adjacent, input-time errors ---
    #[error("command failed: {0}")]
    CommandFailed(String),

    #[error("value cannot be empty")]
    EmptyValue,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("user cancelled operation")]
    UserCancelled,

    #[error("child process exited with code {0}")]
    ChildProcessFailed(i32),

    #[error("no command specified")]
    NoCommandSpecified,

    #[error("audit error: {0}")]
    AuditError(String),
}

impl VaultError {
    /// A stable, machine-readable code for this error kind — used by
    /// CLI callers and tests instead of matching on `Display` text.
    pub fn code(&self) -> &'static str {
        match self {
            Self::VaultNotInitialized(_) => "VAULT_NOT_INITIALIZED",
            Self::VaultAlreadyInitialized(_) => "VAULT_EXISTS",
            Self::VaultLocked => "VAULT_LOCKED",
            Self::WrongPassword { .. } => "WRONG_PASSWORD",
            Self::LockedOut { .. } => "LOCKED_OUT",
            Self::SecretNotFound(_) => "SECRET_NOT_FOUND",
            Self::SecretAlreadyExists(_) => "SECRET_EXISTS",
            Self::InvalidKey(_) => "INVALID_KEY",
            Self::InvalidEnvironment(_) => "INVALID_ENVIRONMENT",
            Self::SecretValueTooLarge => "VALUE_TOO_LARGE",
            Self::InvalidPassword(_) => "INVALID_PASSWORD",
            Self::DecryptionFailed => "DECRYPTION_FAILED",
            Self::KeyDerivationFailed(_) => "KEY_DERIVATION_FAILED",
            Self::VaultCorrupted(_) => "VAULT_CORRUPTED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::SerializationError(_) => "SERIALIZATION_ERROR",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::SessionInvalid(_) => "SESSION_INVALID",
            Self::InvalidBackupFormat(_) => "INVALID_BACKUP_FORMAT",
            Self::InvalidExportFormat(_) => "INVALID_EXPORT_FORMAT",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::CommandFailed(_) => "COMMAND_FAILED",
            Self::EmptyValue => "EMPTY_VALUE",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::UserCancelled => "USER_CANCELLED",
            Self::ChildProcessFailed(_) => "CHILD_PROCESS_FAILED",
            Self::NoCommandSpecified => "NO_COMMAND_SPECIFIED",
            Self::AuditError(_) => "AUDIT_ERROR",
        }
    }
}

/// Convenience type alias for vault engine results.
pub type Result<T> = std::result::Result<T, VaultError>;
