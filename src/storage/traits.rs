//! Storage traits and error types
//!
//! This module defines the trait interface for page store backends and
//! associated error types.

use std::fmt::Debug;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid item id: {0:?}")]
    InvalidId(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for page store implementations
///
/// Pages are keyed by the numeric item id taken from their detail URL.
/// Implementations must be safe to share between worker threads.
pub trait PageStore: Send + Sync + Debug {
    /// Saves raw page content under `id`, replacing any earlier copy
    ///
    /// # Arguments
    ///
    /// * `id` - Item id; must be non-empty and all ASCII digits
    /// * `content` - Raw page content
    fn save(&self, id: &str, content: &str) -> StorageResult<()>;

    /// Lists the ids of every saved page
    fn list_saved_ids(&self) -> StorageResult<Vec<String>>;

    /// Loads the content saved under `id`
    fn load(&self, id: &str) -> StorageResult<String>;

    /// Counts saved pages
    fn count(&self) -> StorageResult<u64> {
        Ok(self.list_saved_ids()?.len() as u64)
    }

    /// Human-readable location of the store
    fn describe(&self) -> String;
}

/// Rejects ids that are not a non-empty run of ASCII digits
pub fn validate_id(id: &str) -> StorageResult<()> {
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(StorageError::InvalidId(id.to_string()))
    }
}
