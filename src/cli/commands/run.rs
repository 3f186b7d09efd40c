//! `envlock run` — inject an environment's secrets into a child process.

use std::process::Command;

use crate::cli::output;
use crate::cli::{open_unlocked, Cli};
use crate::errors::{Result, VaultError};

pub fn execute(cli: &Cli, env: &str, command: &[String]) -> Result<()> {
    if command.is_empty() {
        return Err(VaultError::NoCommandSpecified);
    }

    let environment = env.parse()?;
    let engine = open_unlocked(cli)?;
    let secrets = engine.get_secrets_for_sync(environment)?;

    output::success(&format!(
        "Injected {} secret(s) for '{environment}'",
        secrets.len()
    ));

    let status = Command::new(&command[0])
        .args(&command[1..])
        .envs(&secrets)
        .status()?;

    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(VaultError::ChildProcessFailed(code)),
        None => Err(VaultError::CommandFailed(
            "child process terminated by signal".into(),
        )),
    }
}
