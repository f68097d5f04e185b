//! File-backed store: one JSON object holding every key.
//!
//! Writers hold an exclusive lock on a sidecar `.lock` file for the whole
//! read-modify-write cycle, and replace the data file atomically.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::debug;

use super::{KeyValueStore, StoreError};

type Entries = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileStore {
    /// Open a store at `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);

        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn ensure_parent(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_err(parent, e))?;
            }
        }
        Ok(())
    }

    fn lock(&self, exclusive: bool) -> Result<File, StoreError> {
        self.ensure_parent()?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| self.io_err(&self.lock_path, e))?;

        let locked = if exclusive {
            file.lock_exclusive()
        } else {
            file.lock_shared()
        };
        locked.map_err(|e| self.io_err(&self.lock_path, e))?;

        Ok(file)
    }

    fn read_entries(&self) -> Result<Entries, StoreError> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.io_err(&self.path, e))?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_entries(&self, entries: &Entries) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let json = serde_json::to_string_pretty(entries)?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.io_err(&dir, e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| self.io_err(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.io_err(&self.path, e.error))?;

        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut Entries)) -> Result<(), StoreError> {
        let lock = self.lock(true)?;

        let mut entries = self.read_entries()?;
        apply(&mut entries);
        self.write_entries(&entries)?;

        lock.unlock().map_err(|e| self.io_err(&self.lock_path, e))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let lock = self.lock(false)?;
        let value = self.read_entries()?.remove(key);
        lock.unlock().map_err(|e| self.io_err(&self.lock_path, e))?;

        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        debug!(key, path = %self.path.display(), "Writing store entry");
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if !self.path.exists() {
            return Ok(());
        }

        debug!(key, path = %self.path.display(), "Removing store entry");
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
