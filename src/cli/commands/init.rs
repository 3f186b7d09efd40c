//! `envlock init` — create a new vault.

use crate::cli::output;
use crate::cli::{open_engine, prompt_new_password, Cli};
use crate::errors::Result;

pub fn execute(cli: &Cli) -> Result<()> {
    let (engine, _config) = open_engine(cli)?;

    if engine.is_initialized() {
        output::tip("Run `envlock add <KEY>` to add secrets to the existing vault.");
        return Err(crate::errors::VaultError::VaultAlreadyInitialized(
            engine.db_path(),
        ));
    }

    let password = prompt_new_password()?;
    engine.initialize(&password, false)?;

    output::success(&format!(
        "Vault created at {}",
        engine.db_path().display()
    ));
    output::tip("Run `envlock add <KEY>` to add a secret.");
    output::tip("Run `envlock list` to see all secrets.");
    output::tip("Run `envlock run -- <command>` to inject secrets into a command.");

    Ok(())
}
