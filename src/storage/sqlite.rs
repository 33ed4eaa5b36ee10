use super::{ItemStore, StorageError};
use crate::record::Record;
use anyhow::{Context, Result, anyhow};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;

/// Key-value items stored as JSON rows keyed by `(table, id)`
pub struct SqliteItemStore {
    conn: Mutex<Connection>,
}

impl SqliteItemStore {
    /// Create a new in-memory store
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Open (or create) a store file
    pub fn open(path: &str) -> Result<Self> {
        let conn =
            Connection::open(path).context(format!("Failed to open database at {}", path))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .lock()
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS items (
                    table_name TEXT NOT NULL,
                    id TEXT NOT NULL,
                    body TEXT NOT NULL,
                    PRIMARY KEY (table_name, id)
                );
                "#,
            )
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Insert or replace an item; its `id` field is the row key
    pub fn insert_item(&self, table: &str, item: &Record) -> Result<()> {
        let id = item
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("item has no string 'id' field"))?;
        let body = serde_json::to_string(item).context("Failed to encode item")?;

        self.conn
            .lock()
            .execute(
                "INSERT OR REPLACE INTO items (table_name, id, body) VALUES (?1, ?2, ?3)",
                params![table, id, body],
            )
            .context(format!("Failed to insert item {}", id))?;
        Ok(())
    }

    /// Fetch an item by id
    pub fn get_item(&self, table: &str, id: &str) -> Result<Option<Record>> {
        let body: Option<String> = self
            .conn
            .lock()
            .query_row(
                "SELECT body FROM items WHERE table_name = ?1 AND id = ?2",
                params![table, id],
                |row| row.get(0),
            )
            .optional()
            .context(format!("Failed to query item {}", id))?;

        body.map(|b| serde_json::from_str(&b).context("Failed to decode item"))
            .transpose()
    }

    /// Number of items in a table
    pub fn count(&self, table: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row(
                "SELECT COUNT(*) FROM items WHERE table_name = ?1",
                params![table],
                |row| row.get(0),
            )
            .context("Failed to count items")?;
        Ok(count as usize)
    }
}

impl ItemStore for SqliteItemStore {
    fn put_item(&self, table: &str, item: &Record) -> Result<(), StorageError> {
        self.insert_item(table, item).map_err(StorageError::Sqlite)
    }
}
