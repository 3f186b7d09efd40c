//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::model::{AuditEntry, Secret};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of secret metadata (ciphertext is never shown here).
pub fn print_secrets_table(secrets: &[Secret]) {
    if secrets.is_empty() {
        info("No secrets in this vault yet.");
        tip("Run `envlock add <KEY>` to add your first secret.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Key", "Environment", "Tags", "Updated"]);

    for s in secrets {
        table.add_row(vec![
            s.key.clone(),
            s.environment.to_string(),
            s.tags.join(","),
            format_millis(s.updated_at),
        ]);
    }

    println!("{table}");
}

/// Print the audit log as a table.
pub fn print_audit_table(entries: &[AuditEntry]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Action", "Key", "Environment", "User"]);

    for entry in entries {
        table.add_row(vec![
            format_millis(entry.timestamp),
            colorize_action(entry.action.as_str()),
            entry.secret_key.clone().unwrap_or_else(|| "-".into()),
            entry
                .environment
                .map(|e| e.to_string())
                .unwrap_or_else(|| "-".into()),
            entry.user.clone(),
        ]);
    }

    println!("{}", style(format!("{} audit entries:", entries.len())).bold());
    println!("{table}");
}

fn colorize_action(action: &str) -> String {
    match action {
        "write" => style(action).blue().to_string(),
        "delete" => style(action).red().to_string(),
        "rotate" => style(action).yellow().to_string(),
        "export" | "import" => style(action).cyan().to_string(),
        _ => action.to_string(),
    }
}

pub fn format_millis(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".into())
}
