use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::info;
use rusqlite::{params, Connection, OptionalExtension};

use super::{schema::ensure_schema, PersistStore};

/// SQLite-backed [`PersistStore`].
pub struct SqlitePersist {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqlitePersist {
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create persistence directory {}", parent.display())
            })?;
        }

        let conn = Connection::open(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let store = Self::from_connection(conn, Some(path))?;

        if let Some(path) = store.path() {
            info!("Persistence initialized at {}", path.display());
        }
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory SQLite")?;
        Self::from_connection(conn, None)
    }

    fn from_connection(mut conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        ensure_schema(&mut conn).context("failed to prepare persistence schema")?;
        Ok(Self { conn, path })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl PersistStore for SqlitePersist {
    fn exists(&self, key: u32) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM persist WHERE key = ?1",
                params![i64::from(key)],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("failed to look up key {key}"))?;
        Ok(found.is_some())
    }

    fn read_data(&self, key: u32) -> Result<Option<Vec<u8>>> {
        self.conn
            .query_row(
                "SELECT value FROM persist WHERE key = ?1",
                params![i64::from(key)],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("failed to read key {key}"))
    }

    fn write_data(&mut self, key: u32, data: &[u8]) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO persist (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![i64::from(key), data, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("failed to write key {key}"))?;
        Ok(())
    }

    fn read_int(&self, key: u32) -> Result<Option<i32>> {
        let Some(bytes) = self.read_data(key)? else {
            return Ok(None);
        };
        let raw: [u8; 4] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| anyhow!("key {key} holds {} bytes, not an integer", bytes.len()))?;
        Ok(Some(i32::from_le_bytes(raw)))
    }

    fn write_int(&mut self, key: u32, value: i32) -> Result<()> {
        self.write_data(key, &value.to_le_bytes())
    }
}
