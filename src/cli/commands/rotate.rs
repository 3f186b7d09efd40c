//! `envlock rotate` — re-encrypt a secret's value across environments.

use std::io::{self, IsTerminal, Read};

use crate::cli::output;
use crate::cli::{open_unlocked, Cli};
use crate::errors::{Result, VaultError};
use crate::model::Environment;

pub fn execute(cli: &Cli, key: &str, value: Option<&str>, exclude: &[String]) -> Result<()> {
    let new_value = read_value(key, value)?;
    let exclude: Vec<Environment> = exclude
        .iter()
        .map(|e| e.parse())
        .collect::<Result<_>>()?;

    let engine = open_unlocked(cli)?;
    let count = engine.rotate_secret(key, &new_value, &exclude)?;

    output::success(&format!("Rotated '{key}' across {count} environment(s)"));
    Ok(())
}

fn read_value(key: &str, value: Option<&str>) -> Result<String> {
    if let Some(v) = value {
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
        .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))
}
