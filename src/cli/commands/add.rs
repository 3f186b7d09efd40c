//! `envlock add` — store a brand-new secret.

use std::io::{self, IsTerminal, Read};

use crate::cli::output;
use crate::cli::{open_unlocked, Cli};
use crate::errors::Result;

pub fn execute(
    cli: &Cli,
    key: &str,
    value: Option<&str>,
    env: &str,
    description: Option<&str>,
    tags: &[String],
) -> Result<()> {
    let value = read_value(key, value)?;
    let environment = env.parse()?;

    let engine = open_unlocked(cli)?;
    let secret = engine.add_secret(key, &value, environment, description, tags.to_vec(), None)?;

    output::success(&format!(
        "Secret '{}' added in '{}'",
        secret.key, secret.environment
    ));

    Ok(())
}

/// Source the plaintext value: inline argument, piped stdin, or an
/// interactive prompt, in that order of preference.
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
        .with_prompt(format!("Enter value for {key}"))
        .interact()
        .map_err(|e| crate::errors::VaultError::CommandFailed(format!("input prompt: {e}")))
}
