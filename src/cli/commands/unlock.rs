//! `envlock unlock` — unlock the vault and cache the key for later commands.

use crate::cli::output;
use crate::cli::{open_unlocked, Cli};
use crate::errors::Result;

pub fn execute(cli: &Cli) -> Result<()> {
    // `open_unlocked` already does the work: prompt (or reuse a cached
    // session), unlock, and persist the key to the session cache.
    open_unlocked(cli)?;
    output::success("Vault unlocked.");
    Ok(())
}
