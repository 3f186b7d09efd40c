//! `envlock backup` — write an encrypted snapshot of the vault database.

use crate::backup;
use crate::cli::output;
use crate::cli::{open_engine, prompt_password_with_confirmation, Cli};
use crate::errors::Result;
use crate::model::now_millis;

pub fn execute(cli: &Cli, output_path: Option<&str>, encrypt: bool) -> Result<()> {
    let (engine, _config) = open_engine(cli)?;

    let password = if encrypt {
        Some(prompt_password_with_confirmation(
            "Backup password",
            "Confirm backup password",
            "ENVLOCK_BACKUP_PASSWORD",
        )?)
    } else {
        None
    };

    let password_ref = password.as_ref().map(|p| p.as_str());
    let blob = backup::create_backup(&engine.db_path(), password_ref)?;

    let dest = match output_path {
        Some(p) => std::path::PathBuf::from(p),
        None => {
            let backups_dir = engine
                .db_path()
                .parent()
                .map(|p| p.join("backups"))
                .unwrap_or_else(|| std::path::PathBuf::from("backups"));
            std::fs::create_dir_all(&backups_dir)?;
            backups_dir.join(format!("vault-backup-{}.enc", now_millis()))
        }
    };

    std::fs::write(&dest, &blob)?;
    output::success(&format!("Backup written to {}", dest.display()));

    Ok(())
}
