//! Row-level CRUD for `projects` and the `project_secrets` link table.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::errors::Result;

/// A named working directory that secrets can be linked to for `sync`.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub path: String,
    pub created_at: i64,
    pub last_synced_at: Option<i64>,
}

fn row_to_project(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get("id")?,
        name: row.get("name")?,
        path: row.get("path")?,
        created_at: row.get("created_at")?,
        last_synced_at: row.get("last_synced_at")?,
    })
}

pub fn insert(conn: &Connection, project: &Project) -> Result<()> {
    conn.execute(
        "INSERT INTO projects (id, name, path, created_at, last_synced_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            project.id,
            project.name,
            project.path,
            project.created_at,
            project.last_synced_at,
        ],
    )?;
    Ok(())
}

pub fn find_by_path(conn: &Connection, path: &str) -> Result<Option<Project>> {
    conn.query_row(
        "SELECT * FROM projects WHERE path = ?1",
        params![path],
        row_to_project,
    )
    .optional()
    .map_err(Into::into)
}

pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<Project>> {
    conn.query_row(
        "SELECT * FROM projects WHERE id = ?1",
        params![id],
        row_to_project,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list(conn: &Connection) -> Result<Vec<Project>> {
    let mut stmt = conn.prepare("SELECT * FROM projects ORDER BY name")?;
    let rows = stmt
        .query_map([], row_to_project)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn touch_synced(conn: &Connection, id: &str, now: i64) -> Result<()> {
    conn.execute(
        "UPDATE projects SET last_synced_at = ?1 WHERE id = ?2",
        params![now, id],
    )?;
    Ok(())
}

/// Deletes the project row; `project_secrets` rows for it cascade.
pub fn delete(conn: &Connection, id: &str) -> Result<usize> {
    let n = conn.execute("DELETE FROM projects WHERE id = ?1", params![id])?;
    Ok(n)
}

/// Link a secret to a project. Idempotent: re-linking an already
/// linked pair is a no-op rather than a constraint violation.
pub fn link_secret(conn: &Connection, project_id: &str, secret_id: &str, now: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO project_secrets (project_id, secret_id, added_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(project_id, secret_id) DO NOTHING",
        params![project_id, secret_id, now],
    )?;
    Ok(())
}

pub fn unlink_secret(conn: &Connection, project_id: &str, secret_id: &str) -> Result<usize> {
    let n = conn.execute(
        "DELETE FROM project_secrets WHERE project_id = ?1 AND secret_id = ?2",
        params![project_id, secret_id],
    )?;
    Ok(n)
}

/// Ids of every secret linked to `project_id`.
pub fn linked_secret_ids(conn: &Connection, project_id: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT secret_id FROM project_secrets WHERE project_id = ?1 ORDER BY added_at")?;
    let rows = stmt
        .query_map(params![project_id], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::secrets::{self, insert as insert_secret};
    use crate::store::Database;
    use crate::model::{Environment, Secret};
    use tempfile::TempDir;

    fn project(name: &str, path: &str) -> Project {
        Project {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            path: path.to_string(),
            created_at: 1000,
            last_synced_at: None,
        }
    }

    fn secret(key: &str) -> Secret {
        Secret {
            id: uuid::Uuid::new_v4().to_string(),
            key: key.to_string(),
            value: "ciphertext".to_string(),
            environment: Environment::Dev,
            description: None,
            tags: vec![],
            created_at: 1000,
            updated_at: 1000,
            last_used_at: None,
            expires_at: None,
        }
    }

    #[test]
    fn insert_find_by_path_roundtrip() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("v.db")).unwrap();
        let conn = db.connection();

        let p = project("api", "/home/user/api");
        insert(conn, &p).unwrap();

        let found = find_by_path(conn, "/home/user/api").unwrap().unwrap();
        assert_eq!(found.name, "api");
    }

    #[test]
    fn link_and_unlink_secrets() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("v.db")).unwrap();
        let conn = db.connection();

        let p = project("api", "/home/user/api");
        insert(conn, &p).unwrap();
        let s = secret("DB_URL");
        insert_secret(conn, &s).unwrap();

        link_secret(conn, &p.id, &s.id, 1000).unwrap();
        assert_eq!(linked_secret_ids(conn, &p.id).unwrap(), vec![s.id.clone()]);

        // Re-linking is idempotent.
        link_secret(conn, &p.id, &s.id, 1001).unwrap();
        assert_eq!(linked_secret_ids(conn, &p.id).unwrap().len(), 1);

        unlink_secret(conn, &p.id, &s.id).unwrap();
        assert!(linked_secret_ids(conn, &p.id).unwrap().is_empty());
    }

    #[test]
    fn deleting_project_cascades_link_rows() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("v.db")).unwrap();
        let conn = db.connection();

        let p = project("api", "/home/user/api");
        insert(conn, &p).unwrap();
        let s = secret("DB_URL");
        insert_secret(conn, &s).unwrap();
        link_secret(conn, &p.id, &s.id, 1000).unwrap();

        delete(conn, &p.id).unwrap();
        assert!(find_by_id(conn, &p.id).unwrap().is_none());
        // Secret itself must survive; only the link row is cascaded.
        assert!(secrets::find_exact(conn, "DB_URL", Environment::Dev)
            .unwrap()
            .is_some());
    }
}
