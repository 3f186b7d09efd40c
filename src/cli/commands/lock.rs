//! `envlock lock` — discard the in-memory master key and clear the session.

use crate::cli::output;
use crate::cli::{clear_session, open_engine, Cli};
use crate::errors::Result;

pub fn execute(cli: &Cli) -> Result<()> {
    let (engine, _config) = open_engine(cli)?;
    engine.lock();
    clear_session(&engine.db_path());

    output::success("Vault locked.");
    Ok(())
}
