//! Key-value stores the ledger persists into.
//!
//! [`MemoryStore`] keeps values for the lifetime of the process, [`FileStore`]
//! keeps one JSON file per key inside a directory. Both are wrapped by the
//! [`Store`] enum so the ledger does not need to be generic over its backend.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use enum_dispatch::enum_dispatch;
use log::{debug, trace};
use thiserror::Error;

#[derive(Debug, PartialEq, Error)]
pub enum StorageError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("failed to write {path}: {reason}")]
    Write { path: String, reason: String },
}

#[enum_dispatch]
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[enum_dispatch(KeyValueStore)]
#[derive(Debug)]
pub enum Store {
    MemoryStore,
    FileStore,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> FileStore {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn write_error(path: &Path, reason: impl ToString) -> StorageError {
    StorageError::Write {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Read {
                path: path.display().to_string(),
                reason: err.to_string(),
            }),
        }
    }

    /// Writes to a temp file next to the target, syncs it and renames it over
    /// the target, so a crash never leaves a half written value behind.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|err| write_error(&self.dir, err))?;

        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");

        let file = File::create(&temp_path).map_err(|err| write_error(&temp_path, err))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(value.as_bytes()).map_err(|err| write_error(&temp_path, err))?;
        writer.flush().map_err(|err| write_error(&temp_path, err))?;
        writer.get_ref().sync_all().map_err(|err| write_error(&temp_path, err))?;

        if let Err(err) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(write_error(&path, err));
        }

        trace!("wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("removed {}", path.display());
                Ok(())
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(write_error(&path, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_memory_store() -> Result<()> {
        let mut store = Store::from(MemoryStore::new());
        assert_eq!(store.get("k")?, None);

        store.set("k", "v1")?;
        store.set("k", "v2")?;
        assert_eq!(store.get("k")?, Some("v2".to_string()));

        store.remove("k")?;
        assert_eq!(store.get("k")?, None);

        Ok(())
    }

    #[test]
    fn test_file_store_write_failure() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let blocked = temp_dir.path().join("blocked");
        fs::write(&blocked, "")?;

        let mut store = FileStore::new(&blocked);

        assert!(matches!(store.set("k", "v"), Err(StorageError::Write { .. })));

        Ok(())
    }

    #[test]
    fn test_file_store() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut store = Store::from(FileStore::new(temp_dir.path().join("nested")));

        assert_eq!(store.get("eventosPanamaSales")?, None);

        store.set("eventosPanamaSales", "{\"sales\":[]}")?;
        assert_eq!(store.get("eventosPanamaSales")?, Some("{\"sales\":[]}".to_string()));
        assert!(temp_dir.path().join("nested/eventosPanamaSales.json").exists());
        assert!(!temp_dir.path().join("nested/eventosPanamaSales.json.tmp").exists());

        store.remove("eventosPanamaSales")?;
        store.remove("eventosPanamaSales")?;
        assert_eq!(store.get("eventosPanamaSales")?, None);

        Ok(())
    }
}
