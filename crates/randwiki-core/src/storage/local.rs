//! Device-local key/value storage
//!
//! The anonymous counterpart of the account backend. Each key is stored as
//! `<key>.json` in the storage directory.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use crate::config::Config;

/// File-backed key/value storage with a per-key byte quota
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
    quota: u64,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>, quota: u64) -> Self {
        Self {
            dir: dir.into(),
            quota,
        }
    }

    /// Storage in the configured data directory
    pub fn open(config: &Config) -> Self {
        Self::new(config.storage_dir(), config.storage_quota_bytes)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Raw value stored under `key`, `None` if absent
    pub fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadError { path, source: e }),
        }
    }

    /// Store a raw value under `key`
    pub fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let size = value.len() as u64;
        if size > self.quota {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                size,
                quota: self.quota,
            });
        }
        atomic_write(&self.path_for(key), value.as_bytes())
    }

    /// Delete the value under `key` (absent keys are fine)
    pub fn remove_item(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io(e, path)),
        }
    }

    /// Parse the array stored under `key`.
    ///
    /// Missing keys, unreadable files and malformed JSON all yield an empty
    /// list; the latter two are logged.
    pub fn load_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key, error = %e, "Failed to read local collection");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!(key, error = %e, "Discarding malformed local collection");
                Vec::new()
            }
        }
    }

    /// Serialize `items` and store them under `key`
    pub fn save_list<T: Serialize>(&self, key: &str, items: &[T]) -> StorageResult<()> {
        let json = serde_json::to_string(items).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.set_item(key, &json)?;
        debug!(key, count = items.len(), "Saved local collection");
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    write_with_mode(path, data, None)
}

/// Atomically write a file readable only by its owner
///
/// On unix the temp file is created with mode `0o600`, so the target never
/// exists with wider permissions.
pub(crate) fn write_private(path: &Path, data: &[u8]) -> StorageResult<()> {
    write_with_mode(path, data, Some(0o600))
}

#[cfg_attr(not(unix), allow(unused_variables))]
fn write_with_mode(path: &Path, data: &[u8], mode: Option<u32>) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("tmp");
    // A leftover temp file would keep its old permissions
    let _ = fs::remove_file(&temp_path);

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    if let Some(mode) = mode {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }

    let mut file = options
        .open(&temp_path)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserLink;
    use tempfile::TempDir;

    fn storage(temp_dir: &TempDir) -> LocalStorage {
        LocalStorage::new(temp_dir.path().join("local_storage"), 1024 * 1024)
    }

    #[test]
    fn test_get_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        assert!(storage.get_item("random_wiki_read_log").unwrap().is_none());
        assert!(storage.load_list::<UserLink>("random_wiki_user_links").is_empty());
    }

    #[test]
    fn test_set_and_get_item() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        storage.set_item("k", "[1,2,3]").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("[1,2,3]"));
        assert!(storage.dir().join("k.json").exists());
        assert!(!storage.dir().join("k.tmp").exists());
    }

    #[test]
    fn test_save_and_load_list() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        let links = vec![
            UserLink::new("https://example.org/a", "a"),
            UserLink::new("https://example.org/b", "b").with_notes("later"),
        ];
        storage.save_list("random_wiki_user_links", &links).unwrap();

        let loaded: Vec<UserLink> = storage.load_list("random_wiki_user_links");
        assert_eq!(loaded, links);
    }

    #[test]
    fn test_malformed_json_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        storage.set_item("random_wiki_presets", "{not json").unwrap();
        assert!(storage.load_list::<UserLink>("random_wiki_presets").is_empty());

        // Valid JSON of the wrong shape is malformed too
        storage.set_item("random_wiki_presets", r#"{"a": 1}"#).unwrap();
        assert!(storage.load_list::<UserLink>("random_wiki_presets").is_empty());
    }

    #[test]
    fn test_quota_exceeded_leaves_old_value() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path(), 8);

        storage.set_item("k", "[]").unwrap();
        let err = storage.set_item("k", "[1,2,3,4,5]").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { size: 11, quota: 8, .. }));
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_remove_item() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        storage.set_item("k", "[]").unwrap();
        storage.remove_item("k").unwrap();
        assert!(storage.get_item("k").unwrap().is_none());
        // Removing again is not an error
        storage.remove_item("k").unwrap();
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("file.json");

        atomic_write(&nested_path, b"[]").unwrap();

        assert_eq!(fs::read_to_string(&nested_path).unwrap(), "[]");
    }
}
