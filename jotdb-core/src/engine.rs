// src/engine.rs
// The engine capability boundary. Everything below this trait - page
// layout, index trees, the matcher itself - belongs to the engine and is
// consumed as a black box.

use std::path::Path;

use serde_json::Value;

use crate::document::DocumentId;
use crate::error::Result;

/// Raw result of one engine query dispatch.
pub struct QueryReply {
    /// Materialized result view. Absent for count-only queries.
    pub cursor: Option<Box<dyn Cursor>>,
    /// Number of records in the result set (or affected, for updates).
    pub count: u64,
    /// Query execution log, when one was requested.
    pub log: Option<String>,
}

impl std::fmt::Debug for QueryReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryReply")
            .field("cursor", &self.cursor.as_ref().map(|_| "<cursor>"))
            .field("count", &self.count)
            .field("log", &self.log)
            .finish()
    }
}

/// Sequential view over a query result set.
///
/// Every cursor must be closed exactly once. Closing releases engine-side
/// resources; a second close is an error.
pub trait Cursor {
    /// Advance to the next record. Returns false once exhausted.
    fn next(&mut self) -> bool;

    /// Materialize the record under the cursor.
    fn object(&self) -> Result<Value>;

    /// Release engine-side resources held by this cursor.
    fn close(&mut self) -> Result<()>;
}

/// Tuning knobs applied when a collection is first created. Passing
/// options for an existing collection has no effect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionOptions {
    /// Allow the collection to grow past the engine's small-file limit.
    pub large: bool,
    /// Store records compressed.
    pub compressed: bool,
    /// Expected number of records, used to presize engine structures.
    pub expected_records: Option<i64>,
    /// Number of records to keep in the engine cache.
    pub cached_records: Option<i64>,
}

/// Options for a save batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    /// Merge into the existing document with the same identifier instead
    /// of replacing it.
    pub merge: bool,
}

/// Opaque embedded document database engine.
///
/// Query arguments follow the wire convention `[predicate,
/// ...or_predicates, hints]`: the first element is the primary predicate,
/// the last is the hint object, anything in between is an alternative OR
/// predicate.
pub trait StorageEngine {
    /// Open (or create) the database at `path`. `mode` is a bitmask of the
    /// `OPEN_*` flags.
    fn open(path: &Path, mode: u32) -> Result<Self>
    where
        Self: Sized;

    fn close(&self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Create the collection if missing; `options` apply only on first
    /// creation.
    fn ensure_collection(&self, name: &str, options: &CollectionOptions) -> Result<()>;

    /// Drop a collection. `prune` additionally erases its on-disk data.
    fn remove_collection(&self, name: &str, prune: bool) -> Result<()>;

    /// Persist a batch of documents, assigning identifiers to documents
    /// that lack one. Returns the identifiers in submission order.
    fn save(&self, name: &str, documents: &[Value], options: &SaveOptions)
        -> Result<Vec<DocumentId>>;

    /// Load one document by identifier.
    fn load(&self, name: &str, id: &DocumentId) -> Result<Option<Value>>;

    /// Remove one document by identifier.
    fn remove(&self, name: &str, id: &DocumentId) -> Result<()>;

    /// Execute a query. `mode` is a bitmask of the `QUERY_*` flags.
    fn query(&self, name: &str, args: &[Value], mode: u32) -> Result<QueryReply>;

    /// Apply one composed index-maintenance flag value to a field path.
    fn set_index(&self, name: &str, path: &str, flags: u32) -> Result<()>;

    /// Flush pending engine state to durable storage.
    fn sync(&self) -> Result<()>;
}
