//! In-memory snapshot repository for testing.
//!
//! This adapter provides a pure in-memory implementation of
//! SnapshotRepository, enabling fast tests without any file system I/O.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
};

use crate::{Result, error::Error, ports::SnapshotRepository, store::StateStore};

/// In-memory snapshot repository for testing.
///
/// Stores serialized value tables in a shared HashMap, avoiding file system
/// I/O entirely.
///
/// # Examples
///
/// ```
/// use boardmind::adapters::InMemorySnapshots;
/// use boardmind::ports::SnapshotRepository;
/// use boardmind::store::StateStore;
/// use std::path::Path;
///
/// let repo = InMemorySnapshots::new();
/// let store = StateStore::new();
///
/// repo.save(&store, Path::new("checkpoint"))?;
/// let restored = repo.load(Path::new("checkpoint"))?;
/// # Ok::<(), boardmind::Error>(())
/// ```
///
/// # Thread Safety
///
/// The repository can be cloned freely; all clones share the same
/// underlying storage.
#[derive(Clone)]
pub struct InMemorySnapshots {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemorySnapshots {
    /// Create a new empty in-memory snapshot repository.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of snapshots currently stored.
    pub fn count(&self) -> usize {
        self.storage.lock().unwrap().len()
    }

    /// Drop all stored snapshots.
    pub fn clear(&self) {
        self.storage.lock().unwrap().clear();
    }

    /// Check whether a snapshot exists at the given path.
    pub fn contains(&self, path: &Path) -> bool {
        let key = path.to_string_lossy().to_string();
        self.storage.lock().unwrap().contains_key(&key)
    }
}

impl Default for InMemorySnapshots {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotRepository for InMemorySnapshots {
    fn save(&self, store: &StateStore, path: &Path) -> Result<()> {
        let key = path.to_string_lossy().to_string();

        let bytes = rmp_serde::to_vec(store).map_err(|e| Error::SerializationContext {
            operation: "serialize value table for in-memory storage".to_string(),
            message: e.to_string(),
        })?;

        self.storage.lock().unwrap().insert(key, bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<StateStore> {
        let key = path.to_string_lossy().to_string();
        let storage = self.storage.lock().unwrap();

        let bytes = storage.get(&key).ok_or_else(|| Error::Io {
            operation: format!("load value table from in-memory storage at {path:?}"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "key not found in memory"),
        })?;

        rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationContext {
            operation: "deserialize value table from in-memory storage".to_string(),
            message: e.to_string(),
        })
    }
}
