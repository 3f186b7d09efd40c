//! `envlock sync` — print the merged secrets for an environment.
//!
//! Output is `KEY=value` lines, one per secret, meant to be redirected
//! into a `.env` file or sourced by a shell.

use crate::cli::{open_unlocked, Cli};
use crate::errors::Result;

pub fn execute(cli: &Cli, env: &str) -> Result<()> {
    let environment = env.parse()?;
    let engine = open_unlocked(cli)?;

    let mut secrets: Vec<_> = engine.get_secrets_for_sync(environment)?.into_iter().collect();
    secrets.sort_by(|a, b| a.0.cmp(&b.0));

    for (key, value) in secrets {
        println!("{key}={value}");
    }

    Ok(())
}
