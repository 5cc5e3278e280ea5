use std::path::{Path, PathBuf};

use tracing::debug;

use super::{KeyValueStore, StorageError};

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&dir).map_err(|source| StorageError::Write {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// A store under the platform data directory, e.g.
    /// `~/.local/share/<app_name>` on Linux.
    pub fn in_data_dir(app_name: &str) -> Result<Self, StorageError> {
        let base = dirs::data_dir().ok_or(StorageError::NoDirectory("data"))?;
        Self::new(base.join(app_name))
    }

    /// A store under the platform cache directory.
    pub fn in_cache_dir(app_name: &str) -> Result<Self, StorageError> {
        let base = dirs::cache_dir().ok_or(StorageError::NoDirectory("cache"))?;
        Self::new(base.join(app_name))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.entry_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| StorageError::Read {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;
        std::fs::write(&path, value).map_err(|source| StorageError::Write {
            key: key.to_string(),
            source,
        })?;
        debug!(?path, bytes = value.len(), "Stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;
        if path.exists() {
            std::fs::remove_file(&path).map_err(|source| StorageError::Write {
                key: key.to_string(),
                source,
            })?;
        }
        Ok(())
    }
}
