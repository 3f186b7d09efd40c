//! Row-level CRUD for the `secrets` table.
//!
//! These functions are intentionally dumb: they do not encrypt,
//! decrypt, or validate anything — that is the vault engine's job.
//! This module only knows how to move `Secret` rows in and out of
//! SQLite.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::errors::Result;
use crate::model::{Environment, Secret};

fn row_to_secret(row: &Row) -> rusqlite::Result<Secret> {
    let environment_str: String = row.get("environment")?;
    let environment = environment_str.parse().unwrap_or_default();

    let tags_json: Option<String> = row.get("tags")?;
    let tags = tags_json
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default();

    Ok(Secret {
        id: row.get("id")?,
        key: row.get("key")?,
        value: row.get("value")?,
        environment,
        description: row.get("description")?,
        tags,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        last_used_at: row.get("last_used_at")?,
        expires_at: row.get("expires_at")?,
    })
}

/// Insert a brand-new secret row. Callers must have already verified
/// that `(key, environment)` is not taken.
pub fn insert(conn: &Connection, secret: &Secret) -> Result<()> {
    let tags_json = serde_json::to_string(&secret.tags)
        .map_err(|e| crate::errors::VaultError::SerializationError(e.to_string()))?;

    conn.execute(
        "INSERT INTO secrets
            (id, key, value, environment, description, tags, created_at, updated_at, last_used_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            secret.id,
            secret.key,
            secret.value,
            secret.environment.as_str(),
            secret.description,
            tags_json,
            secret.created_at,
            secret.updated_at,
            secret.last_used_at,
            secret.expires_at,
        ],
    )?;
    Ok(())
}

/// Fetch the row for an exact `(key, environment)` pair.
pub fn find_exact(conn: &Connection, key: &str, environment: Environment) -> Result<Option<Secret>> {
    conn.query_row(
        "SELECT * FROM secrets WHERE key = ?1 AND environment = ?2",
        params![key, environment.as_str()],
        row_to_secret,
    )
    .optional()
    .map_err(Into::into)
}

/// Fetch every row for a given `key`, across all environments.
pub fn find_all_environments(conn: &Connection, key: &str) -> Result<Vec<Secret>> {
    let mut stmt = conn.prepare("SELECT * FROM secrets WHERE key = ?1")?;
    let rows = stmt
        .query_map(params![key], row_to_secret)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// List secrets, optionally filtered to one environment (plus `all`).
/// Ordered by `(key, environment)`.
pub fn list(conn: &Connection, environment: Option<Environment>) -> Result<Vec<Secret>> {
    let mut stmt = match environment {
        Some(_) => conn.prepare(
            "SELECT * FROM secrets WHERE environment = ?1 OR environment = 'all'
             ORDER BY key, environment",
        )?,
        None => conn.prepare("SELECT * FROM secrets ORDER BY key, environment")?,
    };

    let rows = match environment {
        Some(env) => stmt
            .query_map(params![env.as_str()], row_to_secret)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        None => stmt
            .query_map([], row_to_secret)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
    };

    Ok(rows)
}

/// Overwrite the encrypted value (and optionally description/tags) of
/// an existing row, bumping `updated_at`.
pub fn update_value(
    conn: &Connection,
    key: &str,
    environment: Environment,
    new_value: &str,
    description: Option<&str>,
    tags: Option<&[String]>,
    now: i64,
) -> Result<usize> {
    match (description, tags) {
        (Some(d), Some(t)) => {
            let tags_json = serde_json::to_string(t)
                .map_err(|e| crate::errors::VaultError::SerializationError(e.to_string()))?;
            let n = conn.execute(
                "UPDATE secrets SET value = ?1, description = ?2, tags = ?3, updated_at = ?4
                 WHERE key = ?5 AND environment = ?6",
                params![new_value, d, tags_json, now, key, environment.as_str()],
            )?;
            Ok(n)
        }
        (Some(d), None) => {
            let n = conn.execute(
                "UPDATE secrets SET value = ?1, description = ?2, updated_at = ?3
                 WHERE key = ?4 AND environment = ?5",
                params![new_value, d, now, key, environment.as_str()],
            )?;
            Ok(n)
        }
        (None, Some(t)) => {
            let tags_json = serde_json::to_string(t)
                .map_err(|e| crate::errors::VaultError::SerializationError(e.to_string()))?;
            let n = conn.execute(
                "UPDATE secrets SET value = ?1, tags = ?2, updated_at = ?3
                 WHERE key = ?4 AND environment = ?5",
                params![new_value, tags_json, now, key, environment.as_str()],
            )?;
            Ok(n)
        }
        (None, None) => {
            let n = conn.execute(
                "UPDATE secrets SET value = ?1, updated_at = ?2
                 WHERE key = ?3 AND environment = ?4",
                params![new_value, now, key, environment.as_str()],
            )?;
            Ok(n)
        }
    }
}

/// Re-encrypt a single row by id (used by `rotate_secret` and
/// `change_master_password`, which already hold the row's identity).
pub fn update_value_by_id(conn: &Connection, id: &str, new_value: &str, now: i64) -> Result<()> {
    conn.execute(
        "UPDATE secrets SET value = ?1, updated_at = ?2 WHERE id = ?3",
        params![new_value, now, id],
    )?;
    Ok(())
}

/// Bump `last_used_at` for a row identified by id.
pub fn touch_last_used(conn: &Connection, id: &str, now: i64) -> Result<()> {
    conn.execute(
        "UPDATE secrets SET last_used_at = ?1 WHERE id = ?2",
        params![now, id],
    )?;
    Ok(())
}

/// Delete an exact `(key, environment)` row. Returns the number of
/// rows removed (0 or 1).
pub fn delete_exact(conn: &Connection, key: &str, environment: Environment) -> Result<usize> {
    let n = conn.execute(
        "DELETE FROM secrets WHERE key = ?1 AND environment = ?2",
        params![key, environment.as_str()],
    )?;
    Ok(n)
}

/// Delete every row for `key`, across all environments. Returns the
/// number of rows removed.
pub fn delete_all_environments(conn: &Connection, key: &str) -> Result<usize> {
    let n = conn.execute("DELETE FROM secrets WHERE key = ?1", params![key])?;
    Ok(n)
}

/// Escape `%`, `_`, and `\` in a user-supplied substring so it is safe
/// to embed in a `LIKE ... ESCAPE '\'` pattern.
pub fn escape_like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-sensitive substring search against `key` and `description`.
pub fn search(conn: &Connection, substring: &str) -> Result<Vec<Secret>> {
    let escaped = escape_like_pattern(substring);
    let pattern = format!("%{escaped}%");

    let mut stmt = conn.prepare(
        "SELECT * FROM secrets
         WHERE key LIKE ?1 ESCAPE '\\' OR description LIKE ?1 ESCAPE '\\'
         ORDER BY key, environment",
    )?;
    let rows = stmt
        .query_map(params![pattern], row_to_secret)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;
    use tempfile::TempDir;

    fn secret(key: &str, env: Environment, value: &str) -> Secret {
        Secret {
            id: uuid::Uuid::new_v4().to_string(),
            key: key.to_string(),
            value: value.to_string(),
            environment: env,
            description: None,
            tags: vec![],
            created_at: 1000,
            updated_at: 1000,
            last_used_at: None,
            expires_at: None,
        }
    }

    #[test]
    fn insert_find_delete_roundtrip() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("v.db")).unwrap();
        let conn = db.connection();

        let s = secret("API_KEY", Environment::Dev, "ciphertext");
        insert(conn, &s).unwrap();

        let found = find_exact(conn, "API_KEY", Environment::Dev).unwrap();
        assert_eq!(found.unwrap().value, "ciphertext");

        let removed = delete_exact(conn, "API_KEY", Environment::Dev).unwrap();
        assert_eq!(removed, 1);
        assert!(find_exact(conn, "API_KEY", Environment::Dev).unwrap().is_none());
    }

    #[test]
    fn list_filters_by_environment_with_all_fallback() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("v.db")).unwrap();
        let conn = db.connection();

        insert(conn, &secret("A", Environment::Dev, "v1")).unwrap();
        insert(conn, &secret("B", Environment::Dev, "v2")).unwrap();
        insert(conn, &secret("C", Environment::Prod, "v3")).unwrap();
        insert(conn, &secret("D", Environment::All, "v4")).unwrap();

        assert_eq!(list(conn, None).unwrap().len(), 4);
        assert_eq!(list(conn, Some(Environment::Dev)).unwrap().len(), 3); // A, B, D
        assert_eq!(list(conn, Some(Environment::Prod)).unwrap().len(), 2); // C, D
    }

    #[test]
    fn search_escapes_like_metacharacters() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("v.db")).unwrap();
        let conn = db.connection();

        insert(conn, &secret("A_B", Environment::Dev, "v1")).unwrap();
        insert(conn, &secret("AXB", Environment::Dev, "v2")).unwrap();

        // A literal underscore should not match the wildcard "any char".
        let results = search(conn, "A_B").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "A_B");
    }

    #[test]
    fn search_is_case_sensitive() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("v.db")).unwrap();
        let conn = db.connection();

        insert(conn, &secret("STRIPE_KEY", Environment::Dev, "v1")).unwrap();

        assert_eq!(search(conn, "STRIPE").unwrap().len(), 1);
        assert!(search(conn, "stripe").unwrap().is_empty());
    }

    #[test]
    fn delete_all_environments_removes_every_row_for_key() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("v.db")).unwrap();
        let conn = db.connection();

        insert(conn, &secret("K", Environment::Dev, "v1")).unwrap();
        insert(conn, &secret("K", Environment::Prod, "v2")).unwrap();

        let removed = delete_all_environments(conn, "K").unwrap();
        assert_eq!(removed, 2);
        assert_eq!(delete_all_environments(conn, "K").unwrap(), 0);
    }
}
