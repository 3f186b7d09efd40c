//! `envlock export` — write every secret to a portable encrypted bundle.
//!
//! The export password is independent of the vault's master password.

use crate::cli::output;
use crate::cli::{open_unlocked, prompt_password_with_confirmation, Cli};
use crate::errors::Result;
use crate::export::{self, ExportEntry};

pub fn execute(cli: &Cli, output_path: &str) -> Result<()> {
    let engine = open_unlocked(cli)?;
    let secrets = engine.export_all()?;

    let entries: Vec<ExportEntry> = secrets
        .into_iter()
        .map(|s| ExportEntry {
            key: s.key,
            value: s.plaintext,
            environment: s.environment,
            description: s.description,
            tags: if s.tags.is_empty() { None } else { Some(s.tags) },
        })
        .collect();

    let count = entries.len();

    let password = prompt_password_with_confirmation(
        "Export password",
        "Confirm export password",
        "ENVLOCK_EXPORT_PASSWORD",
    )?;

    let blob = export::create_export(&entries, &password)?;
    std::fs::write(output_path, &blob)?;

    output::success(&format!("Exported {count} secret(s) to {output_path}"));
    Ok(())
}
