//! `envlock import` — load secrets from a portable encrypted bundle.
//!
//! A colliding `(key, environment)` is treated as an update rather than
//! a hard failure — there is no separate `--merge` mode.

use crate::cli::output;
use crate::cli::{open_unlocked, prompt_password_for, Cli};
use crate::errors::{Result, VaultError};
use crate::export;

pub fn execute(cli: &Cli, file: &str) -> Result<()> {
    let blob = std::fs::read(file)?;
    let password = prompt_password_for("Export password", "ENVLOCK_EXPORT_PASSWORD")?;
    let entries = export::parse_export(&blob, &password)?;

    let engine = open_unlocked(cli)?;

    let mut added = 0;
    let mut updated = 0;
    for entry in &entries {
        let tags = entry.tags.clone().unwrap_or_default();
        match engine.add_secret(
            &entry.key,
            &entry.value,
            entry.environment,
            entry.description.as_deref(),
            tags,
            None,
        ) {
            Ok(_) => added += 1,
            Err(VaultError::SecretAlreadyExists(_)) => {
                engine.update_secret(
                    &entry.key,
                    &entry.value,
                    entry.environment,
                    entry.description.as_deref(),
                    entry.tags.clone(),
                )?;
                updated += 1;
            }
            Err(e) => return Err(e),
        }
    }

    output::success(&format!(
        "Imported {} secret(s) from {file} ({added} added, {updated} updated)",
        entries.len()
    ));
    Ok(())
}
