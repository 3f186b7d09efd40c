//! `envlock restore` — overwrite the vault database from a backup file.

use crate::backup;
use crate::cli::output;
use crate::cli::{open_engine, prompt_password_for, Cli};
use crate::errors::Result;

pub fn execute(cli: &Cli, file: &str, encrypted: bool) -> Result<()> {
    let (engine, _config) = open_engine(cli)?;

    let blob = std::fs::read(file)?;
    let password = if encrypted {
        Some(prompt_password_for("Backup password", "ENVLOCK_BACKUP_PASSWORD")?)
    } else {
        None
    };

    let db_path = engine.db_path();
    let backups_dir = db_path
        .parent()
        .map(|p| p.join("backups"))
        .unwrap_or_else(|| std::path::PathBuf::from("backups"));

    let password_ref = password.as_ref().map(|p| p.as_str());
    backup::restore_backup(&blob, password_ref, &db_path, &backups_dir)?;
    crate::cli::clear_session(&db_path);

    output::success(&format!("Vault restored from {file}"));
    output::tip("Run `envlock unlock` to access secrets.");
    Ok(())
}
