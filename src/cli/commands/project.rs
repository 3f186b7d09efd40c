//! `envlock project` — register and list project directories linked to the vault.

use std::path::Path;

use crate::cli::output;
use crate::cli::{open_engine, Cli, ProjectAction};
use crate::errors::{Result, VaultError};

const MARKER_FILE: &str = ".secrets.yaml";

pub fn execute(cli: &Cli, action: &ProjectAction) -> Result<()> {
    match action {
        ProjectAction::Init { name } => init(cli, name.as_deref()),
        ProjectAction::List => list(cli),
    }
}

fn init(cli: &Cli, name: Option<&str>) -> Result<()> {
    let (engine, _config) = open_engine(cli)?;

    let cwd = std::env::current_dir()?;
    let path = cwd.to_string_lossy().into_owned();
    let name = name
        .map(str::to_string)
        .or_else(|| cwd.file_name().map(|n| n.to_string_lossy().into_owned()))
        .ok_or_else(|| VaultError::CommandFailed("could not determine project name".into()))?;

    let project = engine.register_project(&name, &path)?;
    write_marker(&cwd, &project.id, &project.name)?;

    output::success(&format!("Registered project '{}' at {path}", project.name));
    output::tip(&format!("Wrote {MARKER_FILE} to mark this directory as a project root."));
    Ok(())
}

fn list(cli: &Cli) -> Result<()> {
    let (engine, _config) = open_engine(cli)?;
    let projects = engine.list_projects()?;

    if projects.is_empty() {
        output::info("No projects registered yet. Run `envlock project init` in a project directory.");
        return Ok(());
    }

    for project in &projects {
        let synced = project
            .last_synced_at
            .map(output::format_millis)
            .unwrap_or_else(|| "never".to_string());
        println!("{}  {}  (last synced: {synced})", project.name, project.path);
    }

    Ok(())
}

fn write_marker(dir: &Path, project_id: &str, name: &str) -> Result<()> {
    let contents = format!("project_id: {project_id}\nname: {name}\n");
    std::fs::write(dir.join(MARKER_FILE), contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o644);
        std::fs::set_permissions(dir.join(MARKER_FILE), perms)?;
    }

    Ok(())
}
