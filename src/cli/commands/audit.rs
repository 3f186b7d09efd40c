//! `envlock audit` — display the persisted audit log.
//!
//! Reading the audit log does not require the vault to be unlocked —
//! audit rows carry no secret plaintext.

use crate::audit::LogFilter;
use crate::cli::output;
use crate::cli::{open_engine, Cli};
use crate::errors::Result;

pub fn execute(cli: &Cli, key: Option<&str>, last: i64) -> Result<()> {
    let (engine, _config) = open_engine(cli)?;

    let filter = LogFilter {
        secret_key: key,
        action: None,
        limit: last,
        offset: 0,
    };
    let entries = engine.get_audit_logs(&filter)?;

    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    output::print_audit_table(&entries);
    Ok(())
}
