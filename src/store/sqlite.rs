use rusqlite::{Connection, OptionalExtension};
use anyhow::Result;
use crate::db::DbConnection;
use super::{PersistenceStore, StoreError, StoreOp};

/// Key-value store backed by the `records` table.
///
/// Batches run inside one transaction, so a renumbering either lands in
/// full or not at all.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wrap an already-migrated connection
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open the configured database (rc file or default location)
    pub fn open() -> Result<Self> {
        Ok(Self::new(DbConnection::connect()?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(DbConnection::connect_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn apply_op(conn: &Connection, op: &StoreOp) -> rusqlite::Result<()> {
    match op {
        StoreOp::Set { key, value } => {
            conn.execute(
                "INSERT INTO records (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                rusqlite::params![key, value],
            )?;
        }
        StoreOp::Delete { key } => {
            conn.execute("DELETE FROM records WHERE key = ?1", [key])?;
        }
    }
    Ok(())
}

impl PersistenceStore for SqliteStore {
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        apply_op(
            &self.conn,
            &StoreOp::Set { key: key.to_string(), value: value.to_string() },
        )?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM records WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        apply_op(&self.conn, &StoreOp::Delete { key: key.to_string() })?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT key FROM records ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }

    fn write_batch(&mut self, ops: &[StoreOp]) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        for op in ops {
            apply_op(&tx, op)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn atomic_batches(&self) -> bool {
        true
    }
}
