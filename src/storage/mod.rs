use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

/// Error surface of the key-value substrate.
///
/// Callers in the cache layer recover from every variant; nothing here is
/// allowed to propagate past the cache operation boundary.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage poisoned: {0}")]
    Poisoned(String),
}

/// Persistent key-value substrate: `get`/`set`/`remove` of serialized strings.
///
/// Implementations serialize individual key reads and writes but offer no
/// cross-key transactions.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory backend. Used in tests and as the fallback when no data
/// directory is available.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

/// File-per-key backend under a data directory.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        debug!("File storage rooted at {}", root.display());
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(encode_key(key))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = self.root.join(format!("{}.tmp", encode_key(key)));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Maps an arbitrary store key to a safe, collision-free file name.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' => {
                out.push(b as char);
            }
            _ => {
                out.push_str(&format!("%{b:02x}"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("tubefeed-storage-test-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn memory_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.get("entries:anonymous").unwrap().is_none());

        storage.set("entries:anonymous", "[1,2,3]").unwrap();
        assert_eq!(
            storage.get("entries:anonymous").unwrap().as_deref(),
            Some("[1,2,3]")
        );

        storage.remove("entries:anonymous").unwrap();
        assert!(storage.get("entries:anonymous").unwrap().is_none());
    }

    #[test]
    fn file_roundtrip() {
        let root = temp_root();
        let storage = FileStorage::new(&root).unwrap();

        storage.set("recency:user-1", r#"["cats"]"#).unwrap();
        assert_eq!(
            storage.get("recency:user-1").unwrap().as_deref(),
            Some(r#"["cats"]"#)
        );

        storage.remove("recency:user-1").unwrap();
        assert!(storage.get("recency:user-1").unwrap().is_none());

        // Removing a missing key is not an error.
        storage.remove("recency:user-1").unwrap();

        std::fs::remove_dir_all(root).ok();
    }

    #[test]
    fn encoded_keys_do_not_collide() {
        assert_ne!(encode_key("entries:a/b"), encode_key("entries:a%2fb"));
        assert_eq!(encode_key("entries:user"), "entries%3auser");
    }
}
