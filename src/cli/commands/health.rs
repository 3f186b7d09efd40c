//! `envlock health` — report the vault's current lifecycle state.

use crate::cli::output;
use crate::cli::{open_engine, Cli};
use crate::errors::Result;
use crate::model::VaultState;

pub fn execute(cli: &Cli) -> Result<()> {
    let (engine, config) = open_engine(cli)?;
    let state = engine.get_state();

    output::info(&format!("vault: {}", engine.db_path().display()));
    output::info(&format!("state: {state}"));

    match state {
        VaultState::NotInitialized => output::tip("Run `envlock init` to create this vault."),
        VaultState::LockedOut => output::warning("Vault is locked out after too many failed unlock attempts."),
        VaultState::Locked => output::tip("Run `envlock unlock` to access secrets."),
        VaultState::Unlocked => output::success("Vault is unlocked."),
    }

    output::info(&format!(
        "auto-lock timeout: {} minute(s)",
        config.auto_lock_timeout_minutes
    ));

    Ok(())
}
