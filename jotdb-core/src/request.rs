// src/request.rs
// Canonical query request: one primary predicate, any number of
// alternative OR predicates, and a hint set. Every query method accepts
// this one shape; construction order never changes what the engine sees.

use serde_json::{Map, Value};

use crate::hints::{Hints, SortOrder};

/// A normalized query request.
///
/// Invariants held by construction: the primary predicate is always a JSON
/// object (an empty object matches every document), the OR list is always
/// present (possibly empty), and the hints are always a well-formed set.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    predicate: Value,
    or: Vec<Value>,
    hints: Hints,
}

/// Anything that is not an object means "match all documents".
fn coerce_predicate(value: Value) -> Value {
    match value {
        Value::Object(_) => value,
        _ => Value::Object(Map::new()),
    }
}

impl QueryRequest {
    pub fn new(predicate: Value) -> Self {
        QueryRequest {
            predicate: coerce_predicate(predicate),
            or: Vec::new(),
            hints: Hints::new(),
        }
    }

    /// Request matching every document in the collection.
    pub fn match_all() -> Self {
        Self::new(Value::Object(Map::new()))
    }

    /// Append an alternative predicate; a document matches the request if
    /// it matches the primary predicate or any appended one.
    pub fn with_or(mut self, predicate: Value) -> Self {
        self.or.push(coerce_predicate(predicate));
        self
    }

    /// Append a batch of alternative predicates in order.
    pub fn with_or_predicates(mut self, predicates: Vec<Value>) -> Self {
        for predicate in predicates {
            self.or.push(coerce_predicate(predicate));
        }
        self
    }

    /// Replace the hint set wholesale.
    pub fn with_hints(mut self, hints: Hints) -> Self {
        self.hints = hints;
        self
    }

    // Hint shortcuts, for callers that never touch `Hints` directly.

    pub fn with_max(mut self, max: u64) -> Self {
        self.hints = std::mem::take(&mut self.hints).with_max(max);
        self
    }

    pub fn with_skip(mut self, skip: u64) -> Self {
        self.hints = std::mem::take(&mut self.hints).with_skip(skip);
        self
    }

    pub fn with_order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.hints = std::mem::take(&mut self.hints).with_order_by(field, order);
        self
    }

    pub fn with_only_count(mut self, only_count: bool) -> Self {
        self.hints = std::mem::take(&mut self.hints).with_only_count(only_count);
        self
    }

    pub fn with_field(mut self, path: &str) -> Self {
        self.hints = std::mem::take(&mut self.hints).with_field(path);
        self
    }

    pub fn with_log(mut self, log: bool) -> Self {
        self.hints = std::mem::take(&mut self.hints).with_log(log);
        self
    }

    pub fn predicate(&self) -> &Value {
        &self.predicate
    }

    pub fn or_predicates(&self) -> &[Value] {
        &self.or
    }

    pub fn hints(&self) -> &Hints {
        &self.hints
    }

    pub(crate) fn hints_mut(&mut self) -> &mut Hints {
        &mut self.hints
    }

    /// Engine argument vector: `[predicate, ...or_predicates, hints]`.
    /// The hints object is always the last element, even when empty.
    pub fn engine_args(&self) -> Vec<Value> {
        let mut args = Vec::with_capacity(self.or.len() + 2);
        args.push(self.predicate.clone());
        args.extend(self.or.iter().cloned());
        args.push(self.hints.to_value());
        args
    }
}

impl Default for QueryRequest {
    fn default() -> Self {
        Self::match_all()
    }
}

impl From<Value> for QueryRequest {
    fn from(predicate: Value) -> Self {
        QueryRequest::new(predicate)
    }
}
