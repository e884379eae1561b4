//! String-keyed blob storage backing the entry store.

use crate::errors::{DiaryError, DiaryResult};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;

/// Key/value storage for whole snapshots.
pub trait SnapshotStorage {
    /// Returns `None` when nothing was ever written under `key`.
    fn read(&self, key: &str) -> DiaryResult<Option<Vec<u8>>>;

    fn write(&mut self, key: &str, bytes: &[u8]) -> DiaryResult<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates the directory if it does not exist yet.
    pub fn open(dir: impl Into<PathBuf>) -> DiaryResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| DiaryError::persistence(dir.display().to_string(), e))?;
        Ok(FileStorage { dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SnapshotStorage for FileStorage {
    fn read(&self, key: &str) -> DiaryResult<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DiaryError::persistence(key, e)),
        }
    }

    /// Writes to a sibling temp file and renames it over the target, so a crash
    /// mid-write never leaves a truncated snapshot behind.
    fn write(&mut self, key: &str, bytes: &[u8]) -> DiaryResult<()> {
        let target = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));

        let result = (|| -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            fs::rename(&tmp, &target)
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(DiaryError::persistence(key, e));
        }
        debug!(key, bytes = bytes.len(), "snapshot written");
        Ok(())
    }
}

/// In-memory storage, mostly for tests. Writes can be made to fail to
/// simulate a full disk.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    blobs: HashMap<String, Vec<u8>>,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(key: &str, bytes: impl Into<Vec<u8>>) -> Self {
        let mut storage = Self::new();
        storage.blobs.insert(key.to_string(), bytes.into());
        storage
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn blob(&self, key: &str) -> Option<&[u8]> {
        self.blobs.get(key).map(Vec::as_slice)
    }

    /// Sorted keys starting with `prefix`.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .blobs
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self, key: &str) -> DiaryResult<Option<Vec<u8>>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> DiaryResult<()> {
        if self.fail_writes {
            return Err(DiaryError::persistence(
                key,
                io::Error::new(io::ErrorKind::Other, "storage quota exceeded"),
            ));
        }
        self.blobs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
