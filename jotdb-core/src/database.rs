// src/database.rs
// Database handle: opens the engine, hands out collection handles, owns
// nothing else. All state lives inside the engine.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::collection::Collection;
use crate::engine::{CollectionOptions, StorageEngine};
use crate::error::{JotError, Result};
use crate::flags;

pub struct Database<E: StorageEngine> {
    engine: Arc<E>,
    path: PathBuf,
}

impl<E: StorageEngine> Database<E> {
    /// Open (or create) a database at `path`. `mode` is a bitmask of the
    /// `OPEN_*` flags.
    pub fn open<P: AsRef<Path>>(path: P, mode: u32) -> Result<Self> {
        let engine = E::open(path.as_ref(), mode)?;
        Ok(Database {
            engine: Arc::new(engine),
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Open read-write, creating the database when missing.
    pub fn open_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, flags::OPEN_DEFAULT)
    }

    /// Wrap an already-constructed engine. Useful when the engine was
    /// configured out of band, and for substituting a test engine.
    pub fn with_engine<P: Into<PathBuf>>(engine: E, path: P) -> Self {
        Database {
            engine: Arc::new(engine),
            path: path.into(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.engine.is_open()
    }

    pub fn close(&self) -> Result<()> {
        self.engine.close()
    }

    /// Flush pending engine state to durable storage.
    pub fn sync(&self) -> Result<()> {
        self.engine.sync()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Borrow the underlying engine handle.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Get a handle to a collection, creating it with default options when
    /// missing.
    pub fn collection(&self, name: &str) -> Result<Collection<E>> {
        self.collection_with_options(name, &CollectionOptions::default())
    }

    /// Get a handle to a collection; `options` apply only if the
    /// collection is created by this call.
    pub fn collection_with_options(
        &self,
        name: &str,
        options: &CollectionOptions,
    ) -> Result<Collection<E>> {
        Self::check_collection_name(name)?;
        self.engine.ensure_collection(name, options)?;
        Ok(Collection::new(name.to_string(), Arc::clone(&self.engine)))
    }

    /// Drop a collection. `prune` additionally erases its on-disk data.
    pub fn remove_collection(&self, name: &str, prune: bool) -> Result<()> {
        Self::check_collection_name(name)?;
        self.engine.remove_collection(name, prune)
    }

    fn check_collection_name(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(JotError::InvalidArgument(
                "collection name must be a non-empty string".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryEngine;

    #[test]
    fn test_empty_collection_name_rejected() {
        let db = Database::with_engine(MemoryEngine::new(), ":memory:");
        let err = db.collection("").unwrap_err();
        assert!(matches!(err, JotError::InvalidArgument(_)));

        let err = db.remove_collection("", false).unwrap_err();
        assert!(matches!(err, JotError::InvalidArgument(_)));
    }

    #[test]
    fn test_open_close_cycle() {
        let db: Database<MemoryEngine> =
            Database::open("jot-test.db", flags::OPEN_DEFAULT).unwrap();
        assert!(db.is_open());
        db.close().unwrap();
        assert!(!db.is_open());

        // A second close reports the engine as already shut down.
        assert!(db.close().is_err());
    }

    #[test]
    fn test_path_is_preserved() {
        let db = Database::with_engine(MemoryEngine::new(), "some/dir/app.db");
        assert_eq!(db.path(), Path::new("some/dir/app.db"));
    }
}
