//! `envlock change-password` — re-key the vault under a new master password.

use crate::cli::output;
use crate::cli::{clear_session, open_engine, prompt_new_password, prompt_password, Cli};
use crate::errors::Result;

pub fn execute(cli: &Cli) -> Result<()> {
    let (engine, _config) = open_engine(cli)?;

    output::info("Enter your current vault password.");
    let old_password = prompt_password()?;

    output::info("Choose your new vault password.");
    let new_password = prompt_new_password()?;

    engine.change_master_password(&old_password, &new_password)?;
    clear_session(&engine.db_path());

    output::success("Master password changed; every secret was re-encrypted.");
    Ok(())
}
