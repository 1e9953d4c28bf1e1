//! MessagePack implementation of the snapshot repository.
//!
//! This adapter implements the SnapshotRepository port using rmp_serde for
//! compact binary serialization of value tables.

use std::{fs::File, path::Path};

use crate::{Result, error::Error, ports::SnapshotRepository, store::StateStore};

/// MessagePack-based snapshot repository.
///
/// Persists value tables in the MessagePack binary format via rmp_serde.
/// The format is compact and fast to read back, which matters once a table
/// has grown over many training games.
///
/// # Examples
///
/// ```no_run
/// use boardmind::adapters::MsgPackSnapshots;
/// use boardmind::ports::SnapshotRepository;
/// use boardmind::store::StateStore;
/// use std::path::Path;
///
/// let repo = MsgPackSnapshots;
/// let store = StateStore::new();
///
/// repo.save(&store, Path::new("trained.msgpack"))?;
/// let restored = repo.load(Path::new("trained.msgpack"))?;
/// # Ok::<(), boardmind::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackSnapshots;

impl MsgPackSnapshots {
    /// Create a new MessagePack snapshot repository.
    pub fn new() -> Self {
        Self
    }
}

impl SnapshotRepository for MsgPackSnapshots {
    fn save(&self, store: &StateStore, path: &Path) -> Result<()> {
        let mut file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;

        rmp_serde::encode::write(&mut file, store).map_err(|e| Error::SerializationContext {
            operation: "serialize value table to MessagePack".to_string(),
            message: e.to_string(),
        })?;

        Ok(())
    }

    fn load(&self, path: &Path) -> Result<StateStore> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        let store =
            rmp_serde::decode::from_read(&file).map_err(|e| Error::SerializationContext {
                operation: "deserialize value table from MessagePack".to_string(),
                message: e.to_string(),
            })?;

        Ok(store)
    }
}
