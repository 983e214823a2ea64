//! Local SQLite backend for the inventory collection.
//!
//! One row per item, keyed by name. Conditional writes are single guarded
//! statements (judged by the affected-row count), so they are atomic without
//! explicit transactions. Doubles as the test backend via `open_in_memory`.

use crate::backend::InventoryBackend;
use crate::error::Result;
use crate::models::InventoryItem;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// SQLite-backed inventory collection.
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    /// Open (or create) the database file at `path` and initialise the schema.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        log::info!("Opened inventory database: {}", path.display());
        Self::from_connection(conn)
    }

    /// In-memory database, used by tests and throwaway runs.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

/// Create the `inventory` table if it does not already exist.
///
/// The CHECK constraint enforces the collection invariant: a stored item
/// always has quantity >= 1.
fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS inventory (
            name       TEXT NOT NULL PRIMARY KEY,
            quantity   INTEGER NOT NULL CHECK (quantity >= 1),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;
    log::debug!("Inventory schema initialized");
    Ok(())
}

#[async_trait]
impl InventoryBackend for SqliteBackend {
    async fn get(&self, name: &str) -> Result<Option<u32>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached("SELECT quantity FROM inventory WHERE name = ?1")?;
        let mut rows = stmt.query(params![name])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, name: &str, quantity: u32) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO inventory (name, quantity) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET
                 quantity   = excluded.quantity,
                 updated_at = datetime('now')",
            params![name, quantity],
        )?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM inventory WHERE name = ?1", params![name])?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<InventoryItem>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached("SELECT name, quantity FROM inventory")?;
        let items: rusqlite::Result<Vec<InventoryItem>> = stmt
            .query_map([], |row| {
                Ok(InventoryItem {
                    name: row.get(0)?,
                    quantity: row.get(1)?,
                })
            })?
            .collect();
        Ok(items?)
    }

    async fn create_if_absent(&self, name: &str, quantity: u32) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "INSERT INTO inventory (name, quantity) VALUES (?1, ?2)
             ON CONFLICT(name) DO NOTHING",
            params![name, quantity],
        )?;
        Ok(changed == 1)
    }

    async fn set_if_equals(&self, name: &str, expected: u32, quantity: u32) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE inventory
             SET quantity = ?3, updated_at = datetime('now')
             WHERE name = ?1 AND quantity = ?2",
            params![name, expected, quantity],
        )?;
        Ok(changed == 1)
    }

    async fn delete_if_equals(&self, name: &str, expected: u32) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "DELETE FROM inventory WHERE name = ?1 AND quantity = ?2",
            params![name, expected],
        )?;
        Ok(changed == 1)
    }
}
