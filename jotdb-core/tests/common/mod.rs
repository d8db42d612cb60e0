// Shared test fixtures: a scripted engine that replies with a canned
// result set and records every call it receives.
// Not every test binary uses every fixture method.
#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use jotdb_core::{
    CollectionOptions, Cursor, DocumentId, JotError, QueryReply, Result, SaveOptions,
    StorageEngine,
};

/// One recorded query dispatch.
#[derive(Debug, Clone)]
pub struct RecordedQuery {
    pub collection: String,
    pub args: Vec<Value>,
    pub mode: u32,
}

/// Scripted engine for protocol tests. Every query returns a cursor over
/// the same canned documents (even in count-only mode, so cursor release
/// discipline can be observed) and is recorded for later inspection.
pub struct ProbeEngine {
    docs: Vec<Value>,
    fail_extraction: bool,
    queries: Mutex<Vec<RecordedQuery>>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl ProbeEngine {
    pub fn with_docs(docs: Vec<Value>) -> Self {
        ProbeEngine {
            docs,
            fail_extraction: false,
            queries: Mutex::new(Vec::new()),
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Engine whose cursors fail to materialize records.
    pub fn failing_extraction(docs: Vec<Value>) -> Self {
        ProbeEngine {
            fail_extraction: true,
            ..Self::with_docs(docs)
        }
    }

    pub fn queries(&self) -> Vec<RecordedQuery> {
        self.queries.lock().clone()
    }

    pub fn last_query(&self) -> RecordedQuery {
        self.queries.lock().last().cloned().expect("no query recorded")
    }

    pub fn cursors_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn cursors_closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl StorageEngine for ProbeEngine {
    fn open(_path: &Path, _mode: u32) -> Result<Self> {
        Ok(Self::with_docs(Vec::new()))
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }

    fn is_open(&self) -> bool {
        true
    }

    fn ensure_collection(&self, _name: &str, _options: &CollectionOptions) -> Result<()> {
        Ok(())
    }

    fn remove_collection(&self, _name: &str, _prune: bool) -> Result<()> {
        Ok(())
    }

    fn save(
        &self,
        _name: &str,
        documents: &[Value],
        _options: &SaveOptions,
    ) -> Result<Vec<DocumentId>> {
        Ok((0..documents.len())
            .map(|i| DocumentId::Int(i as i64 + 1))
            .collect())
    }

    fn load(&self, _name: &str, _id: &DocumentId) -> Result<Option<Value>> {
        Ok(None)
    }

    fn remove(&self, _name: &str, _id: &DocumentId) -> Result<()> {
        Ok(())
    }

    fn query(&self, name: &str, args: &[Value], mode: u32) -> Result<QueryReply> {
        self.queries.lock().push(RecordedQuery {
            collection: name.to_string(),
            args: args.to_vec(),
            mode,
        });
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(QueryReply {
            cursor: Some(Box::new(ProbeCursor {
                docs: self.docs.clone(),
                current: None,
                upcoming: 0,
                closed: false,
                fail_extraction: self.fail_extraction,
                closed_counter: Arc::clone(&self.closed),
            })),
            count: self.docs.len() as u64,
            log: None,
        })
    }

    fn set_index(&self, _name: &str, _path: &str, _flags: u32) -> Result<()> {
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        Ok(())
    }
}

struct ProbeCursor {
    docs: Vec<Value>,
    current: Option<usize>,
    upcoming: usize,
    closed: bool,
    fail_extraction: bool,
    closed_counter: Arc<AtomicUsize>,
}

impl Cursor for ProbeCursor {
    fn next(&mut self) -> bool {
        if self.closed || self.upcoming >= self.docs.len() {
            self.current = None;
            return false;
        }
        self.current = Some(self.upcoming);
        self.upcoming += 1;
        true
    }

    fn object(&self) -> Result<Value> {
        if self.fail_extraction {
            return Err(JotError::engine("simulated extraction failure"));
        }
        self.current
            .and_then(|index| self.docs.get(index))
            .cloned()
            .ok_or_else(|| JotError::engine("cursor is not positioned on a record"))
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(JotError::engine("cursor already closed"));
        }
        self.closed = true;
        self.closed_counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
