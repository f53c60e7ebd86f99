//! SQLite-backed key-value store.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::Store;

/// Durable [`Store`] over a single `kv` table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store at the given path, creating parent
    /// directories as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;

        // WAL mode for better concurrent read performance
        conn.pragma_update(None, "journal_mode", "WAL")?;

        init_schema(&conn).context("failed to initialize schema")?;

        tracing::info!(path = %path.display(), "store opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database. Unlike [`super::MemStore`] this exercises
    /// the real SQL path.
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("failed to open in-memory database")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

impl Store for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .with_context(|| format!("failed to read key {key}"))?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .with_context(|| format!("failed to write key {key}"))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .with_context(|| format!("failed to remove key {key}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_and_remove() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        assert_eq!(store.get("missing").unwrap(), None);

        store.set("memlog:u1", r#"[{"role":"user"}]"#).unwrap();
        assert_eq!(
            store.get("memlog:u1").unwrap().as_deref(),
            Some(r#"[{"role":"user"}]"#)
        );

        store.set("memlog:u1", "[]").unwrap();
        assert_eq!(store.get("memlog:u1").unwrap().as_deref(), Some("[]"));

        store.remove("memlog:u1").unwrap();
        assert_eq!(store.get("memlog:u1").unwrap(), None);
    }

    #[test]
    fn large_payload_survives() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let big = "x".repeat(1 << 20);
        store.set("big", &big).unwrap();
        assert_eq!(store.get("big").unwrap().as_deref(), Some(big.as_str()));
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.set("personas", "[]").unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("personas").unwrap().as_deref(), Some("[]"));
    }
}
