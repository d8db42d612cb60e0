// src/collection.rs
// Per-collection query surface: dispatches normalized requests to the
// engine and projects raw replies into per-method result shapes.

use std::sync::Arc;

use log::debug;
use serde_json::Value;

use crate::document::{self, DocumentId, ID_FIELD};
use crate::engine::{QueryReply, SaveOptions, StorageEngine};
use crate::error::{JotError, Result};
use crate::flags;
use crate::request::QueryRequest;

/// Result of [`Collection::find`]. The caller owns the cursor and must
/// close it; for count-only queries no cursor is materialized.
pub struct FindResult {
    pub cursor: Option<Box<dyn crate::engine::Cursor>>,
    pub count: u64,
    pub log: Option<String>,
}

/// Outcome of an update query.
#[derive(Debug, Clone)]
pub struct UpdateResult {
    /// Number of records the update touched.
    pub count: u64,
    /// Query execution log, when one was requested.
    pub log: Option<String>,
}

/// Handle to one named collection.
pub struct Collection<E: StorageEngine> {
    name: String,
    engine: Arc<E>,
}

impl<E: StorageEngine> std::fmt::Debug for Collection<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<E: StorageEngine> Collection<E> {
    pub(crate) fn new(name: String, engine: Arc<E>) -> Self {
        Collection { name, engine }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ========== QUERIES ==========

    /// Run a query and hand the materialized cursor to the caller.
    ///
    /// With a `$onlycount` hint the engine skips materialization and the
    /// returned cursor is absent.
    pub fn find(&self, request: &QueryRequest) -> Result<FindResult> {
        let mode = if request.hints().wants_only_count() {
            flags::QUERY_COUNT_ONLY
        } else {
            0
        };
        debug!(
            "find on '{}': {} OR predicate(s), mode {:#x}",
            self.name,
            request.or_predicates().len(),
            mode
        );

        let QueryReply { cursor, count, log } =
            self.engine.query(&self.name, &request.engine_args(), mode)?;
        Ok(FindResult { cursor, count, log })
    }

    /// Return the first matching document, or `None`.
    ///
    /// The result cap is forced to one record; the underlying cursor is
    /// consumed here and closed on every path before this returns.
    pub fn find_one(&self, request: &QueryRequest) -> Result<Option<Value>> {
        let mut request = request.clone();
        // Cap, not correctness: only the first record is ever read.
        request.hints_mut().force_max(1);

        let reply = self.engine.query(&self.name, &request.engine_args(), 0)?;
        let Some(mut cursor) = reply.cursor else {
            return Ok(None);
        };

        if cursor.next() {
            let object = cursor.object();
            let closed = cursor.close();
            let object = object?;
            closed?;
            Ok(Some(object))
        } else {
            // Nothing matched. The cursor never advanced, but release it
            // anyway rather than trusting the engine to collect it.
            cursor.close()?;
            Ok(None)
        }
    }

    /// Count matching records. The engine cursor, if one comes back, is
    /// closed here; callers never see it.
    pub fn count(&self, request: &QueryRequest) -> Result<u64> {
        let QueryReply { cursor, count, .. } =
            self.engine
                .query(&self.name, &request.engine_args(), flags::QUERY_COUNT_ONLY)?;
        if let Some(mut cursor) = cursor {
            cursor.close()?;
        }
        Ok(count)
    }

    /// Run an update query (a predicate carrying `$set`, `$inc`,
    /// `$dropall`, `$addToSet` or `$pull` operators) and report how many
    /// records it touched.
    ///
    /// The execution log is propagated whether the update succeeds or
    /// fails; on failure it rides on [`JotError::Engine`].
    pub fn update(&self, request: &QueryRequest) -> Result<UpdateResult> {
        let QueryReply { cursor, count, log } =
            self.engine
                .query(&self.name, &request.engine_args(), flags::QUERY_COUNT_ONLY)?;
        if let Some(mut cursor) = cursor {
            cursor.close()?;
        }
        Ok(UpdateResult { count, log })
    }

    /// Fire-and-forget update: failures are discarded, by contract. Use
    /// [`Collection::update`] when the outcome matters.
    pub fn update_detached(&self, request: &QueryRequest) {
        if let Err(err) = self.update(request) {
            debug!("detached update on '{}' dropped an error: {}", self.name, err);
        }
    }

    // ========== PERSISTENCE ==========

    /// Save a batch of documents.
    ///
    /// Documents without an identifier get one assigned by the engine, and
    /// the assigned identifier is written back into each submitted
    /// document in place - callers observe the mutation. Returns the
    /// identifiers in submission order.
    pub fn save(&self, documents: &mut [Value]) -> Result<Vec<DocumentId>> {
        self.save_with(documents, &SaveOptions::default())
    }

    /// [`Collection::save`] with explicit save options.
    pub fn save_with(
        &self,
        documents: &mut [Value],
        options: &SaveOptions,
    ) -> Result<Vec<DocumentId>> {
        let ids = self.engine.save(&self.name, documents, options)?;
        for (doc, id) in documents.iter_mut().zip(ids.iter()) {
            let assigned = id.to_value();
            if doc.get(ID_FIELD) != Some(&assigned) {
                document::assign_id(doc, id);
            }
        }
        Ok(ids)
    }

    /// Save a single document, returning its identifier.
    pub fn save_one(&self, doc: &mut Value) -> Result<DocumentId> {
        let ids = self.save(std::slice::from_mut(doc))?;
        ids.into_iter()
            .next()
            .ok_or_else(|| JotError::engine("save returned no identifier"))
    }

    /// Load one document by identifier.
    pub fn load(&self, id: &DocumentId) -> Result<Option<Value>> {
        self.engine.load(&self.name, id)
    }

    /// Remove one document by identifier.
    pub fn remove(&self, id: &DocumentId) -> Result<()> {
        self.engine.remove(&self.name, id)
    }

    // ========== INDEX MAINTENANCE ==========
    // Each operation composes one type flag with zero or more modifiers
    // into a single engine call.

    fn set_index(&self, path: &str, flag_bits: u32) -> Result<()> {
        debug!(
            "set_index on '{}': path '{}', flags {:#04x}",
            self.name, path, flag_bits
        );
        self.engine.set_index(&self.name, path, flag_bits)
    }

    pub fn ensure_string_index(&self, path: &str) -> Result<()> {
        self.set_index(path, flags::INDEX_STRING)
    }

    pub fn rebuild_string_index(&self, path: &str) -> Result<()> {
        self.set_index(path, flags::INDEX_STRING | flags::INDEX_REBUILD)
    }

    pub fn drop_string_index(&self, path: &str) -> Result<()> {
        self.set_index(path, flags::INDEX_STRING | flags::INDEX_DROP)
    }

    pub fn ensure_istring_index(&self, path: &str) -> Result<()> {
        self.set_index(path, flags::INDEX_ISTRING)
    }

    pub fn rebuild_istring_index(&self, path: &str) -> Result<()> {
        self.set_index(path, flags::INDEX_ISTRING | flags::INDEX_REBUILD)
    }

    pub fn drop_istring_index(&self, path: &str) -> Result<()> {
        self.set_index(path, flags::INDEX_ISTRING | flags::INDEX_DROP)
    }

    pub fn ensure_number_index(&self, path: &str) -> Result<()> {
        self.set_index(path, flags::INDEX_NUMBER)
    }

    pub fn rebuild_number_index(&self, path: &str) -> Result<()> {
        self.set_index(path, flags::INDEX_NUMBER | flags::INDEX_REBUILD)
    }

    pub fn drop_number_index(&self, path: &str) -> Result<()> {
        self.set_index(path, flags::INDEX_NUMBER | flags::INDEX_DROP)
    }

    pub fn ensure_array_index(&self, path: &str) -> Result<()> {
        self.set_index(path, flags::INDEX_ARRAY)
    }

    pub fn rebuild_array_index(&self, path: &str) -> Result<()> {
        self.set_index(path, flags::INDEX_ARRAY | flags::INDEX_REBUILD)
    }

    pub fn drop_array_index(&self, path: &str) -> Result<()> {
        self.set_index(path, flags::INDEX_ARRAY | flags::INDEX_DROP)
    }

    /// Drop every index kept for a field path, regardless of type.
    pub fn drop_indexes(&self, path: &str) -> Result<()> {
        self.set_index(path, flags::INDEX_DROP_ALL)
    }

    /// Optimize the indexes kept for a field path.
    pub fn optimize_indexes(&self, path: &str) -> Result<()> {
        self.set_index(path, flags::INDEX_OPTIMIZE)
    }
}
