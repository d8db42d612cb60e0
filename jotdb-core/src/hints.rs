// src/hints.rs
// Query hints: result cap, offset, ordering, projection, count-only and
// log switches. Hints ride along with every query as its last engine
// argument; keys this layer does not recognize pass through untouched.

use serde_json::{Map, Value};

const MAX: &str = "$max";
const SKIP: &str = "$skip";
const ORDER_BY: &str = "$orderby";
const ONLY_COUNT: &str = "$onlycount";
const FIELDS: &str = "$fields";
const LOG: &str = "$log";

/// Sort direction for `$orderby` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_i64(self) -> i64 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

/// Hint set attached to a query request.
///
/// Key order is preserved; for `$orderby` the order of fields is the sort
/// precedence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hints {
    entries: Map<String, Value>,
}

impl Hints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coerce a raw JSON value into a hint set. Anything that is not an
    /// object resets to the empty hint set; missing optional structure is
    /// not an error.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Hints {
                entries: map.clone(),
            },
            _ => Hints::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cap the number of returned records.
    pub fn with_max(mut self, max: u64) -> Self {
        self.entries.insert(MAX.to_string(), Value::from(max));
        self
    }

    /// Skip the first `skip` records of the result set.
    pub fn with_skip(mut self, skip: u64) -> Self {
        self.entries.insert(SKIP.to_string(), Value::from(skip));
        self
    }

    /// Append a sort field. Earlier calls take precedence.
    pub fn with_order_by(mut self, field: &str, order: SortOrder) -> Self {
        let slot = self
            .entries
            .entry(ORDER_BY)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = slot {
            map.insert(field.to_string(), Value::from(order.as_i64()));
        }
        self
    }

    /// Ask the engine for the match count only, without materializing
    /// results.
    pub fn with_only_count(mut self, only_count: bool) -> Self {
        self.entries
            .insert(ONLY_COUNT.to_string(), Value::Bool(only_count));
        self
    }

    /// Restrict returned documents to the given field.
    pub fn with_field(mut self, path: &str) -> Self {
        let slot = self
            .entries
            .entry(FIELDS)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = slot {
            map.insert(path.to_string(), Value::from(1));
        }
        self
    }

    /// Request a query execution log from the engine.
    pub fn with_log(mut self, log: bool) -> Self {
        self.entries.insert(LOG.to_string(), Value::Bool(log));
        self
    }

    /// Set an arbitrary hint key. Unrecognized keys are forwarded to the
    /// engine uninterpreted.
    pub fn with_raw(mut self, key: &str, value: Value) -> Self {
        self.entries.insert(key.to_string(), value);
        self
    }

    // ========== ACCESSORS ==========

    pub fn wants_only_count(&self) -> bool {
        self.entries.get(ONLY_COUNT).map_or(false, truthy)
    }

    pub fn wants_log(&self) -> bool {
        self.entries.get(LOG).map_or(false, truthy)
    }

    pub fn max_hint(&self) -> Option<u64> {
        self.entries.get(MAX).and_then(Value::as_u64)
    }

    pub fn skip_hint(&self) -> Option<u64> {
        self.entries.get(SKIP).and_then(Value::as_u64)
    }

    /// Sort specification in precedence order: `(field, direction)` with
    /// direction 1 (ascending) or -1 (descending).
    pub fn order_spec(&self) -> Vec<(String, i64)> {
        match self.entries.get(ORDER_BY) {
            Some(Value::Object(map)) => map
                .iter()
                .filter_map(|(field, dir)| dir.as_i64().map(|d| (field.clone(), d)))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Projection field paths, when a `$fields` hint is present.
    pub fn field_projection(&self) -> Option<Vec<String>> {
        match self.entries.get(FIELDS) {
            Some(Value::Object(map)) => Some(
                map.iter()
                    .filter(|(_, keep)| keep.as_i64() == Some(1))
                    .map(|(path, _)| path.clone())
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Overwrite `$max`, regardless of what the caller asked for.
    pub(crate) fn force_max(&mut self, max: u64) {
        self.entries.insert(MAX.to_string(), Value::from(max));
    }

    /// Hint set as the JSON object sent to the engine.
    pub fn to_value(&self) -> Value {
        Value::Object(self.entries.clone())
    }
}

pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        _ => false,
    }
}
