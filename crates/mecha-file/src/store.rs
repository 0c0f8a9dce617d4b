//! JSON-file key-value store.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, instrument};

use mecha_core::error::StorageError;
use mecha_core::{KeyValueStore, Result};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

fn map_io(err: std::io::Error) -> StorageError {
    StorageError::Io {
        message: err.to_string(),
    }
}

/// A key-value store persisted as a flat JSON object on disk.
///
/// Writes take an exclusive advisory lock on a sibling `.lock` file, write a
/// temp file and rename it over the target, so concurrent processes never
/// see a half-written session. The file is created with mode 0600 since it
/// holds bearer tokens.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store backed by `path`. The file is created on first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path).map_err(map_io)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        let entries = serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
            message: format!("{}: {e}", self.path.display()),
        })?;
        Ok(entries)
    }

    /// Apply `update` to the stored map under the write lock.
    fn modify(&self, update: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(map_io)?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
            .map_err(map_io)?;
        lock_file.lock_exclusive().map_err(map_io)?;

        let result = self.read_all().and_then(|mut entries| {
            update(&mut entries);
            self.write_atomic(&entries)
        });

        lock_file.unlock().map_err(map_io)?;
        result
    }

    fn write_atomic(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries).map_err(|e| StorageError::Corrupt {
            message: e.to_string(),
        })?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, json.as_bytes()).map_err(map_io)?;

        #[cfg(unix)]
        fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600)).map_err(map_io)?;

        fs::rename(&temp_path, &self.path).map_err(map_io)?;
        debug!(path = %self.path.display(), keys = entries.len(), "persisted session store");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn set_many(&self, pairs: &[(&str, &str)]) -> Result<()> {
        self.modify(|entries| {
            for (key, value) in pairs {
                entries.insert((*key).to_string(), (*value).to_string());
            }
        })
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.modify(|entries| {
            for key in keys {
                entries.remove(*key);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mecha_core::Error;

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));
        assert_eq!(store.get("access_token").unwrap(), None);
    }

    #[test]
    fn roundtrip_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        FileStore::new(&path)
            .set_many(&[("access_token", "A1"), ("refresh_token", "R1")])
            .unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("access_token").unwrap().as_deref(), Some("A1"));
        assert_eq!(reopened.get("refresh_token").unwrap().as_deref(), Some("R1"));
    }

    #[test]
    fn remove_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));
        store
            .set_many(&[("access_token", "A1"), ("theme", "dark")])
            .unwrap();

        store.remove("access_token").unwrap();

        assert_eq!(store.get("access_token").unwrap(), None);
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn remove_on_missing_file_does_not_create_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        FileStore::new(&path).remove_many(&["access_token"]).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("mecha").join("session.json");
        FileStore::new(&path).set("access_token", "A1").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json {{").unwrap();

        let err = FileStore::new(&path).get("access_token").unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Corrupt { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn file_permissions_are_0600() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        FileStore::new(&path).set("access_token", "A1").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "session file must be 0600, got {mode:o}");
    }

    #[test]
    fn concurrent_writers_do_not_lose_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = FileStore::new(&path);
                std::thread::spawn(move || {
                    let key = format!("key-{i}");
                    store.set(&key, "value").unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let store = FileStore::new(&path);
        for i in 0..8 {
            assert!(store.get(&format!("key-{i}")).unwrap().is_some());
        }
    }
}
