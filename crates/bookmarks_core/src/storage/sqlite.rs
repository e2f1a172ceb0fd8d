//! SQLite-backed slot storage over the `kv_slots` table.
//!
//! # Invariants
//! - The slot schema version is mirrored to `PRAGMA user_version`.
//! - A database stamped with a newer version is refused, never rewritten.

use super::{BackendError, BackendResult, StorageBackend};
use log::{debug, error, info};
use rusqlite::{params, Connection};
use std::path::Path;
use std::time::{Duration, Instant};

/// Slot schema version written by this build.
pub const SLOT_SCHEMA_VERSION: u32 = 1;

const SLOT_SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS kv_slots (
    key TEXT PRIMARY KEY NOT NULL,
    value BLOB NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000)
);";

/// Slot storage owning one SQLite connection.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Opens (or creates) the database file, creating missing parent
    /// directories.
    pub fn open(path: impl AsRef<Path>) -> BackendResult<Self> {
        let path = path.as_ref();
        Self::open_with("file", || {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Ok(Connection::open(path)?)
        })
    }

    /// Opens a throwaway in-memory database.
    pub fn open_in_memory() -> BackendResult<Self> {
        Self::open_with("memory", || Ok(Connection::open_in_memory()?))
    }

    /// Wraps an existing connection, creating the slot table if needed.
    pub fn try_new(conn: Connection) -> BackendResult<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        ensure_slot_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Underlying connection, for inspection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn open_with(
        mode: &'static str,
        connect: impl FnOnce() -> BackendResult<Connection>,
    ) -> BackendResult<Self> {
        let started_at = Instant::now();
        let result = connect().and_then(Self::try_new);

        match &result {
            Ok(_) => info!(
                "event=sqlite_open module=storage status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=sqlite_open module=storage status=error mode={} duration_ms={} error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

fn ensure_slot_schema(conn: &Connection) -> BackendResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if found > SLOT_SCHEMA_VERSION {
        return Err(BackendError::UnsupportedSchemaVersion {
            found,
            supported: SLOT_SCHEMA_VERSION,
        });
    }
    if found < SLOT_SCHEMA_VERSION {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(SLOT_SCHEMA_SQL)?;
        tx.execute_batch(&format!("PRAGMA user_version = {SLOT_SCHEMA_VERSION};"))?;
        tx.commit()?;
    }
    Ok(())
}

impl StorageBackend for SqliteBackend {
    fn read(&self, key: &str) -> BackendResult<Option<Vec<u8>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM kv_slots WHERE key = ?1;")?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(row.get(0)?));
        }

        Ok(None)
    }

    fn write(&self, key: &str, value: &[u8]) -> BackendResult<()> {
        self.conn.execute(
            "INSERT INTO kv_slots (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;

        debug!(
            "event=slot_write module=storage backend=sqlite key={} bytes={}",
            key,
            value.len()
        );
        Ok(())
    }
}
