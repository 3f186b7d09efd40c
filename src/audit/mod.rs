//! Audit log — append-only SQLite-backed history of vault operations.
//!
//! Distinct from the ambient `tracing` output the engine also emits:
//! this log is persisted, queryable, and exported as part of the
//! vault's own data — not a debugging aid.

use rusqlite::{params, Connection, Row};

use crate::errors::Result;
use crate::model::{now_millis, AuditAction, AuditEntry, Environment};

fn row_to_entry(row: &Row) -> rusqlite::Result<AuditEntry> {
    let action_str: String = row.get("action")?;
    let environment_str: Option<String> = row.get("environment")?;

    Ok(AuditEntry {
        id: row.get("id")?,
        timestamp: row.get("timestamp")?,
        action: action_str.parse().unwrap_or(AuditAction::Read),
        secret_key: row.get("secret_key")?,
        environment: environment_str.and_then(|s| s.parse().ok()),
        user: row.get("user")?,
        ip_address: row.get("ip_address")?,
        metadata: row.get("metadata")?,
    })
}

/// OS username for the `user` column, falling back to `"unknown"` when
/// neither `$USER` nor `$USERNAME` is set (e.g. a stripped container).
pub fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Append one audit entry. Fire-and-forget from the caller's
/// perspective: unlike the teacher's audit log, failures here *do*
/// propagate, since the spec treats the audit trail as load-bearing
/// data rather than a best-effort diagnostic.
pub fn record(
    conn: &Connection,
    action: AuditAction,
    secret_key: Option<&str>,
    environment: Option<Environment>,
    metadata: Option<&str>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO audit_logs (id, timestamp, action, secret_key, environment, user, ip_address, metadata)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7)",
        params![
            uuid::Uuid::new_v4().to_string(),
            now_millis(),
            action.as_str(),
            secret_key,
            environment.map(|e| e.as_str()),
            current_user(),
            metadata,
        ],
    )?;
    Ok(())
}

/// Filter parameters for `get_logs`.
#[derive(Debug, Clone, Default)]
pub struct LogFilter<'a> {
    pub secret_key: Option<&'a str>,
    pub action: Option<AuditAction>,
    pub limit: i64,
    pub offset: i64,
}

impl<'a> LogFilter<'a> {
    pub fn new() -> Self {
        Self {
            secret_key: None,
            action: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// Fetch audit entries filtered and ordered by timestamp descending.
pub fn get_logs(conn: &Connection, filter: &LogFilter) -> Result<Vec<AuditEntry>> {
    let mut sql = String::from("SELECT * FROM audit_logs WHERE 1 = 1");
    if filter.secret_key.is_some() {
        sql.push_str(" AND secret_key = ?1");
    }
    if filter.action.is_some() {
        let placeholder = if filter.secret_key.is_some() { "?2" } else { "?1" };
        sql.push_str(&format!(" AND action = {placeholder}"));
    }
    sql.push_str(" ORDER BY timestamp DESC LIMIT ? OFFSET ?");

    let mut stmt = conn.prepare(&sql)?;

    let rows = match (filter.secret_key, filter.action) {
        (Some(key), Some(action)) => stmt
            .query_map(params![key, action.as_str(), filter.limit, filter.offset], row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        (Some(key), None) => stmt
            .query_map(params![key, filter.limit, filter.offset], row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        (None, Some(action)) => stmt
            .query_map(params![action.as_str(), filter.limit, filter.offset], row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        (None, None) => stmt
            .query_map(params![filter.limit, filter.offset], row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
    };

    Ok(rows)
}

/// Total row count, optionally scoped to one secret key — used by
/// callers to compute pagination.
pub fn get_log_count(conn: &Connection, secret_key: Option<&str>) -> Result<i64> {
    let count = match secret_key {
        Some(key) => conn.query_row(
            "SELECT COUNT(*) FROM audit_logs WHERE secret_key = ?1",
            params![key],
            |row| row.get(0),
        )?,
        None => conn.query_row("SELECT COUNT(*) FROM audit_logs", [], |row| row.get(0))?,
    };
    Ok(count)
}

/// Delete every row except the most recent `keep_last_n` by timestamp.
/// Returns the number of rows removed.
pub fn prune_logs(conn: &Connection, keep_last_n: usize) -> Result<usize> {
    let removed = conn.execute(
        "DELETE FROM audit_logs WHERE id NOT IN (
            SELECT id FROM audit_logs ORDER BY timestamp DESC LIMIT ?1
        )",
        params![keep_last_n as i64],
    )?;
    Ok(removed)
}

/// All matching entries with a generously large limit, for export.
pub fn export_logs(conn: &Connection, secret_key: Option<&str>) -> Result<Vec<AuditEntry>> {
    let filter = LogFilter {
        secret_key,
        action: None,
        limit: 100_000,
        offset: 0,
    };
    get_logs(conn, &filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;
    use tempfile::TempDir;

    #[test]
    fn record_and_query_roundtrip() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("v.db")).unwrap();
        let conn = db.connection();

        record(conn, AuditAction::Write, Some("API_KEY"), Some(Environment::Dev), None).unwrap();
        record(conn, AuditAction::Read, Some("API_KEY"), Some(Environment::Dev), None).unwrap();
        record(conn, AuditAction::Delete, Some("OLD_KEY"), None, None).unwrap();

        let entries = get_logs(conn, &LogFilter::new()).unwrap();
        assert_eq!(entries.len(), 3);
        // Most recent first.
        assert_eq!(entries[0].action, AuditAction::Delete);
    }

    #[test]
    fn filters_by_secret_key_and_action() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("v.db")).unwrap();
        let conn = db.connection();

        record(conn, AuditAction::Write, Some("A"), Some(Environment::Dev), None).unwrap();
        record(conn, AuditAction::Write, Some("B"), Some(Environment::Dev), None).unwrap();
        record(conn, AuditAction::Read, Some("A"), Some(Environment::Dev), None).unwrap();

        let filter = LogFilter {
            secret_key: Some("A"),
            action: None,
            limit: 50,
            offset: 0,
        };
        assert_eq!(get_logs(conn, &filter).unwrap().len(), 2);

        let filter = LogFilter {
            secret_key: None,
            action: Some(AuditAction::Write),
            limit: 50,
            offset: 0,
        };
        assert_eq!(get_logs(conn, &filter).unwrap().len(), 2);
    }

    #[test]
    fn prune_keeps_only_most_recent() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("v.db")).unwrap();
        let conn = db.connection();

        for i in 0..10 {
            record(conn, AuditAction::Write, Some(&format!("K{i}")), None, None).unwrap();
        }

        let removed = prune_logs(conn, 3).unwrap();
        assert_eq!(removed, 7);
        assert_eq!(get_log_count(conn, None).unwrap(), 3);
    }

    #[test]
    fn get_log_count_scoped_to_key() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("v.db")).unwrap();
        let conn = db.connection();

        record(conn, AuditAction::Write, Some("A"), None, None).unwrap();
        record(conn, AuditAction::Write, Some("B"), None, None).unwrap();

        assert_eq!(get_log_count(conn, Some("A")).unwrap(), 1);
        assert_eq!(get_log_count(conn, None).unwrap(), 2);
    }
}
