//! Input validation shared by the engine and the CLI layer.

use regex::Regex;
use std::sync::OnceLock;

use crate::errors::{Result, VaultError};
use crate::model::Environment;

/// Secrets can hold at most 64 KiB of plaintext.
pub const MAX_SECRET_VALUE_LEN: usize = 64 * 1024;

const MAX_KEY_LEN: usize = 255;

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap())
}

/// A secret key must look like a shell-safe environment variable name:
/// uppercase, starting with a letter, only letters/digits/underscore.
pub fn validate_secret_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(VaultError::InvalidKey("key cannot be empty".into()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(VaultError::InvalidKey(format!(
            "key exceeds {MAX_KEY_LEN} characters"
        )));
    }
    if !key_pattern().is_match(key) {
        return Err(VaultError::InvalidKey(format!(
            "'{key}' must start with a letter and contain only uppercase letters, digits, and underscores"
        )));
    }
    Ok(())
}

/// Parses and validates an environment name in one step.
pub fn validate_environment(name: &str) -> Result<Environment> {
    name.parse()
}

pub fn validate_secret_value(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(VaultError::EmptyValue);
    }
    if value.len() > MAX_SECRET_VALUE_LEN {
        return Err(VaultError::SecretValueTooLarge);
    }
    Ok(())
}

/// Coarse password strength classification, used by the CLI to warn
/// (not block) on weak master passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    Medium,
    Strong,
}

/// Validates a candidate master password and returns its strength.
///
/// Requirements: at least 12 characters, and all four character
/// classes (upper, lower, digit, special) — each one is mandatory, not
/// three-of-four.
pub fn validate_password(password: &str) -> Result<PasswordStrength> {
    const MIN_LEN: usize = 12;

    if password.len() < MIN_LEN {
        return Err(VaultError::InvalidPassword(vec![format!(
            "password must be at least {MIN_LEN} characters"
        )]));
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_ascii_alphanumeric());

    if !(has_upper && has_lower && has_digit && has_special) {
        let mut missing = Vec::new();
        if !has_upper {
            missing.push("an uppercase letter".to_string());
        }
        if !has_lower {
            missing.push("a lowercase letter".to_string());
        }
        if !has_digit {
            missing.push("a digit".to_string());
        }
        if !has_special {
            missing.push("a special character".to_string());
        }
        return Err(VaultError::InvalidPassword(missing));
    }

    let strength = if password.len() >= 16 {
        PasswordStrength::Strong
    } else {
        PasswordStrength::Medium
    };

    Ok(strength)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_keys() {
        assert!(validate_secret_key("DATABASE_URL").is_ok());
        assert!(validate_secret_key("A").is_ok());
        assert!(validate_secret_key("API_KEY_2").is_ok());
    }

    #[test]
    fn rejects_lowercase_and_leading_digit() {
        assert!(validate_secret_key("database_url").is_err());
        assert!(validate_secret_key("2FA_KEY").is_err());
        assert!(validate_secret_key("").is_err());
    }

    #[test]
    fn rejects_keys_exceeding_max_len() {
        let long_key = format!("A{}", "B".repeat(300));
        assert!(validate_secret_key(&long_key).is_err());
    }

    #[test]
    fn validates_environment_names() {
        assert!(validate_environment("dev").is_ok());
        assert!(validate_environment("qa").is_err());
    }

    #[test]
    fn rejects_short_password() {
        assert!(validate_password("Short1!").is_err());
    }

    #[test]
    fn rejects_password_missing_classes() {
        assert!(validate_password("alllowercase12").is_err());
    }

    #[test]
    fn accepts_and_grades_passwords() {
        assert_eq!(
            validate_password("Correct1Horse!").unwrap(),
            PasswordStrength::Medium
        );
        assert_eq!(
            validate_password("Correct-Horse-Battery9").unwrap(),
            PasswordStrength::Strong
        );
    }

    #[test]
    fn rejects_password_missing_any_single_class() {
        assert!(validate_password("nouppercase1!").is_err());
        assert!(validate_password("NOLOWERCASE1!").is_err());
        assert!(validate_password("NoDigitsHere!!").is_err());
        assert!(validate_password("NoSpecialChars12").is_err());
    }

    #[test]
    fn empty_and_oversized_values_rejected() {
        assert!(validate_secret_value("").is_err());
        let huge = "x".repeat(MAX_SECRET_VALUE_LEN + 1);
        assert!(validate_secret_value(&huge).is_err());
        assert!(validate_secret_value("fits-fine").is_ok());
    }
}
