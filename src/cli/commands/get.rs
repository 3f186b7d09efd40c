//! `envlock get` — retrieve and print a single secret's value.

use crate::cli::{open_unlocked, Cli};
use crate::errors::{Result, VaultError};

pub fn execute(cli: &Cli, key: &str, env: &str) -> Result<()> {
    let environment = env.parse()?;
    let engine = open_unlocked(cli)?;

    match engine.get_secret(key, environment)? {
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => Err(VaultError::SecretNotFound(key.to_string())),
    }
}
