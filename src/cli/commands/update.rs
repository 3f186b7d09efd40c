//! `envlock update` — change an existing secret's value.

use std::io::{self, IsTerminal, Read};

use crate::cli::output;
use crate::cli::{open_unlocked, Cli};
use crate::errors::Result;

pub fn execute(cli: &Cli, key: &str, value: Option<&str>, env: &str, description: Option<&str>) -> Result<()> {
    let value = read_value(key, value)?;
    let environment = env.parse()?;

    let engine = open_unlocked(cli)?;
    engine.update_secret(key, &value, environment, description, None)?;

    output::success(&format!("Secret '{key}' updated in '{environment}'"));
    Ok(())
}

fn read_value(key: &str, value: Option<&str>) -> Result<String> {
    if let Some(v) = value {
        output::warning("Value provided on command line — it may appear in shell history.");
        return Ok(v.to_string());
    }

    if !io::stdin().is_terminal() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf.trim_end().to_string());
    }

    dialoguer::Password::new()
        .with_prompt(format!("Enter new value for {key}"))
        .interact()
        .map_err(|e| crate::errors::VaultError::CommandFailed(format!("input prompt: {e}")))
}
