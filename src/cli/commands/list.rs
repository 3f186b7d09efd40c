//! `envlock list` — display secret metadata in a table.

use crate::cli::output;
use crate::cli::{open_unlocked, Cli};
use crate::errors::Result;

pub fn execute(cli: &Cli, env: Option<&str>) -> Result<()> {
    let environment = env.map(str::parse).transpose()?;
    let engine = open_unlocked(cli)?;

    let secrets = engine.list_secrets(environment)?;
    output::info(&format!("{} secret(s)", secrets.len()));
    output::print_secrets_table(&secrets);

    Ok(())
}
