//! Snapshot port for value-table persistence.
//!
//! This module defines the trait boundary between the domain and
//! infrastructure layers for saving and restoring learned value tables.
//! The in-memory table remains the source of truth; persistence is an
//! explicit extension.

use std::path::Path;

use crate::{Result, store::StateStore};

/// Port for persisting and loading learned value tables.
///
/// This trait abstracts the storage mechanism, allowing different
/// implementations (MessagePack files, in-memory maps for tests, a
/// database) without coupling the learning core to a serialization format.
///
/// # Examples
///
/// ```no_run
/// use boardmind::ports::SnapshotRepository;
/// use boardmind::store::StateStore;
/// use std::path::Path;
///
/// fn checkpoint<R: SnapshotRepository>(
///     repo: &R,
///     store: &StateStore,
///     path: &Path,
/// ) -> boardmind::Result<()> {
///     repo.save(store, path)
/// }
/// ```
pub trait SnapshotRepository {
    /// Save a value table to persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be written or serialization
    /// fails.
    fn save(&self, store: &StateStore, path: &Path) -> Result<()>;

    /// Load a value table from persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be read, or
    /// holds an invalid or corrupted table.
    fn load(&self, path: &Path) -> Result<StateStore>;
}
