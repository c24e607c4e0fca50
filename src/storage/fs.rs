//! Directory page store
//!
//! One file per saved page, named by its item id.

use crate::storage::traits::{validate_id, PageStore, StorageError, StorageResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Page store writing `<dir>/<id>` files
#[derive(Debug)]
pub struct FsPageStore {
    dir: PathBuf,
}

impl FsPageStore {
    /// Opens (and creates if needed) the pages directory
    pub fn open(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl PageStore for FsPageStore {
    fn save(&self, id: &str, content: &str) -> StorageResult<()> {
        validate_id(id)?;
        fs::write(self.dir.join(id), content)?;
        Ok(())
    }

    fn list_saved_ids(&self) -> StorageResult<Vec<String>> {
        let mut ids = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            // Stray files (editor backups, dotfiles) are not pages.
            match entry.file_name().into_string() {
                Ok(name) if validate_id(&name).is_ok() => ids.push(name),
                Ok(name) => tracing::debug!("Ignoring non-page file {}", name),
                Err(name) => tracing::debug!("Ignoring non-UTF-8 file {:?}", name),
            }
        }

        Ok(ids)
    }

    fn load(&self, id: &str) -> StorageResult<String> {
        validate_id(id)?;
        fs::read_to_string(self.dir.join(id)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::PageNotFound(id.to_string()),
            _ => StorageError::Io(e),
        })
    }

    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }
}
