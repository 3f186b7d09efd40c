//! `envlock delete` — remove a secret from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_unlocked, Cli};
use crate::errors::{Result, VaultError};

pub fn execute(cli: &Cli, key: &str, env: Option<&str>, force: bool) -> Result<()> {
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete secret '{key}'?"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let engine = open_unlocked(cli)?;

    match env {
        Some(env) => {
            let environment = env.parse()?;
            engine.delete_secret(key, environment)?;
            output::success(&format!("Deleted secret '{key}' in '{environment}'"));
        }
        None => {
            let removed = engine.delete_secret_all_envs(key)?;
            if removed == 0 {
                return Err(VaultError::SecretNotFound(key.to_string()));
            }
            output::success(&format!("Deleted secret '{key}' ({removed} row(s))"));
        }
    }

    Ok(())
}
