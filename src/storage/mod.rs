//! Storage module for persisting harvested pages
//!
//! This module handles:
//! - The `PageStore` interface used by workers to save in-scope pages
//! - Enumerating saved ids so a restarted run can seed its explored set
//! - Directory and SQLite backends

mod fs;
mod schema;
mod sqlite;
mod traits;

pub use fs::FsPageStore;
pub use sqlite::SqlitePageStore;
pub use traits::{validate_id, PageStore, StorageError, StorageResult};

use crate::config::{OutputConfig, StorageBackend};
use std::path::Path;
use std::sync::Arc;

/// Opens the page store selected by the output configuration
///
/// # Arguments
///
/// * `config` - The `[output]` section of the configuration
///
/// # Returns
///
/// * `Ok(Arc<dyn PageStore>)` - Store ready to be shared with workers
/// * `Err(StorageError)` - Failed to create the directory or open the database
pub fn open_store(config: &OutputConfig) -> StorageResult<Arc<dyn PageStore>> {
    let store: Arc<dyn PageStore> = match config.backend {
        StorageBackend::Directory => Arc::new(FsPageStore::open(&config.pages_dir)?),
        StorageBackend::Sqlite => Arc::new(SqlitePageStore::open(Path::new(
            &config.database_path,
        ))?),
    };

    tracing::debug!("Opened page store: {}", store.describe());
    Ok(store)
}
