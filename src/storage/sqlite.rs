//! SQLite page store implementation
//!
//! This module provides a SQLite-based implementation of the PageStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{validate_id, PageStore, StorageError, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// SQLite page store backend
///
/// A single connection is shared by all workers behind a mutex.
#[derive(Debug)]
pub struct SqlitePageStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqlitePageStore {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqlitePageStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PageStore for SqlitePageStore {
    fn save(&self, id: &str, content: &str) -> StorageResult<()> {
        validate_id(id)?;
        let now = Utc::now().to_rfc3339();
        self.conn().execute(
            "INSERT INTO pages (item_id, content, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(item_id) DO UPDATE SET content = excluded.content, saved_at = excluded.saved_at",
            params![id, content, now],
        )?;
        Ok(())
    }

    fn list_saved_ids(&self) -> StorageResult<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT item_id FROM pages ORDER BY saved_at, item_id")?;

        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ids)
    }

    fn load(&self, id: &str) -> StorageResult<String> {
        validate_id(id)?;
        self.conn()
            .query_row(
                "SELECT content FROM pages WHERE item_id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StorageError::PageNotFound(id.to_string()))
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("sqlite {}", path.display()),
            None => "sqlite (in memory)".to_string(),
        }
    }
}
