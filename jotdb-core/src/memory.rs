// src/memory.rs
// In-memory reference engine. Implements the full `StorageEngine`
// contract without touching disk; it backs the test suite and doubles as
// a behavioral reference for real engine bindings. The matcher here is
// deliberately naive - no planner, no indexes, a full scan per query.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::debug;
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};

use crate::document::{self, DocumentId, ID_FIELD};
use crate::engine::{CollectionOptions, Cursor, QueryReply, SaveOptions, StorageEngine};
use crate::error::{JotError, Result};
use crate::flags;
use crate::hints::{truthy, Hints};

#[derive(Default)]
struct MemCollection {
    /// Canonical identifier string -> document.
    docs: BTreeMap<String, Value>,
    /// Field path -> registered index type bits.
    indexes: BTreeMap<String, u32>,
    options: CollectionOptions,
}

struct State {
    open: bool,
    collections: BTreeMap<String, MemCollection>,
}

/// One recorded `set_index` call, kept for inspection by tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCall {
    pub collection: String,
    pub path: String,
    pub flags: u32,
}

pub struct MemoryEngine {
    state: RwLock<State>,
    path: PathBuf,
    mode: u32,
    open_cursors: Arc<AtomicUsize>,
    index_journal: Mutex<Vec<IndexCall>>,
}

impl std::fmt::Debug for MemoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEngine")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl MemoryEngine {
    /// Fresh engine with the default open mode, not tied to any path.
    pub fn new() -> Self {
        MemoryEngine {
            state: RwLock::new(State {
                open: true,
                collections: BTreeMap::new(),
            }),
            path: PathBuf::from(":memory:"),
            mode: flags::OPEN_DEFAULT,
            open_cursors: Arc::new(AtomicUsize::new(0)),
            index_journal: Mutex::new(Vec::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> u32 {
        self.mode
    }

    /// Number of cursors handed out and not yet closed.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Recorded `set_index` calls, oldest first.
    pub fn index_calls(&self) -> Vec<IndexCall> {
        self.index_journal.lock().clone()
    }

    /// Index type bits currently registered for a field path.
    pub fn index_flags(&self, collection: &str, path: &str) -> Option<u32> {
        let state = self.state.read();
        state
            .collections
            .get(collection)?
            .indexes
            .get(path)
            .copied()
    }

    /// Options a collection was created with.
    pub fn collection_options(&self, collection: &str) -> Option<CollectionOptions> {
        let state = self.state.read();
        state
            .collections
            .get(collection)
            .map(|coll| coll.options.clone())
    }

    /// Number of live records in a collection.
    pub fn record_count(&self, collection: &str) -> usize {
        let state = self.state.read();
        state
            .collections
            .get(collection)
            .map_or(0, |coll| coll.docs.len())
    }

    fn check_open(state: &State) -> Result<()> {
        if !state.open {
            return Err(JotError::engine("database is not open"));
        }
        Ok(())
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine for MemoryEngine {
    fn open(path: &Path, mode: u32) -> Result<Self> {
        if mode & (flags::OPEN_READER | flags::OPEN_WRITER) == 0 {
            return Err(JotError::engine(
                "open mode must include reader or writer access",
            ));
        }
        // OPEN_TRUNCATE is moot: a fresh in-memory engine is always empty.
        let mut engine = Self::new();
        engine.path = path.to_path_buf();
        engine.mode = mode;
        Ok(engine)
    }

    fn close(&self) -> Result<()> {
        let mut state = self.state.write();
        Self::check_open(&state)?;
        state.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.read().open
    }

    fn ensure_collection(&self, name: &str, options: &CollectionOptions) -> Result<()> {
        let mut state = self.state.write();
        Self::check_open(&state)?;
        state
            .collections
            .entry(name.to_string())
            .or_insert_with(|| MemCollection {
                options: options.clone(),
                ..MemCollection::default()
            });
        Ok(())
    }

    fn remove_collection(&self, name: &str, prune: bool) -> Result<()> {
        let mut state = self.state.write();
        Self::check_open(&state)?;
        // There is no on-disk data; prune and plain removal coincide.
        let _ = prune;
        state.collections.remove(name);
        Ok(())
    }

    fn save(
        &self,
        name: &str,
        documents: &[Value],
        options: &SaveOptions,
    ) -> Result<Vec<DocumentId>> {
        let mut state = self.state.write();
        Self::check_open(&state)?;
        let coll = state.collections.entry(name.to_string()).or_default();

        let mut ids = Vec::with_capacity(documents.len());
        for doc in documents {
            let Value::Object(fields) = doc else {
                return Err(JotError::engine("documents must be JSON objects"));
            };
            let id = match fields.get(ID_FIELD) {
                Some(value) => DocumentId::from_value(value).ok_or_else(|| {
                    JotError::engine("document identifier must be an integer or a string")
                })?,
                None => DocumentId::new_object_id(),
            };

            let key = id_key(&id);
            let mut stored = doc.clone();
            document::assign_id(&mut stored, &id);

            match coll.docs.get_mut(&key) {
                Some(existing) if options.merge => merge_into(existing, &stored),
                _ => {
                    coll.docs.insert(key, stored);
                }
            }
            ids.push(id);
        }
        debug!("saved {} document(s) into '{}'", ids.len(), name);
        Ok(ids)
    }

    fn load(&self, name: &str, id: &DocumentId) -> Result<Option<Value>> {
        let state = self.state.read();
        Self::check_open(&state)?;
        Ok(state
            .collections
            .get(name)
            .and_then(|coll| coll.docs.get(&id_key(id)))
            .cloned())
    }

    fn remove(&self, name: &str, id: &DocumentId) -> Result<()> {
        let mut state = self.state.write();
        Self::check_open(&state)?;
        if let Some(coll) = state.collections.get_mut(name) {
            coll.docs.remove(&id_key(id));
        }
        Ok(())
    }

    fn query(&self, name: &str, args: &[Value], mode: u32) -> Result<QueryReply> {
        let mut state = self.state.write();
        Self::check_open(&state)?;

        let (predicate, or, hints) = split_args(args);
        let wants_log = hints.wants_log();
        let mut log_lines = Vec::new();
        if wants_log {
            log_lines.push(format!("collection: {}", name));
            log_lines.push(format!(
                "predicates: 1 primary, {} alternative(s)",
                or.len()
            ));
            log_lines.push(format!("mode: {:#x}", mode));
        }

        let (criteria, ops) = match partition_predicate(predicate) {
            Ok(parts) => parts,
            Err(err) => return Err(attach_log(err, wants_log, &log_lines)),
        };

        if !ops.is_empty() {
            let count = match run_update(&mut state, name, &criteria, or, &ops) {
                Ok(count) => count,
                Err(err) => return Err(attach_log(err, wants_log, &log_lines)),
            };
            if wants_log {
                log_lines.push(format!("updated: {}", count));
            }
            return Ok(QueryReply {
                cursor: None,
                count,
                log: wants_log.then(|| log_lines.join("\n")),
            });
        }

        let scanned = state
            .collections
            .get(name)
            .map_or(0, |coll| coll.docs.len());
        let mut selected = Vec::new();
        if let Some(coll) = state.collections.get(name) {
            for doc in coll.docs.values() {
                match matches_any(&criteria, or, doc) {
                    Ok(true) => selected.push(doc.clone()),
                    Ok(false) => {}
                    Err(err) => return Err(attach_log(err, wants_log, &log_lines)),
                }
            }
        }

        let order = hints.order_spec();
        if !order.is_empty() {
            sort_documents(&mut selected, &order);
            if wants_log {
                log_lines.push(format!("order: {} field(s)", order.len()));
            }
        }

        let skip = hints.skip_hint().unwrap_or(0) as usize;
        if skip > 0 {
            selected.drain(..skip.min(selected.len()));
        }
        if let Some(max) = hints.max_hint() {
            selected.truncate(max as usize);
        }

        let count = selected.len() as u64;
        if wants_log {
            log_lines.push(format!("selected: {} of {}", count, scanned));
        }

        let count_only = mode & flags::QUERY_COUNT_ONLY != 0 || hints.wants_only_count();
        let cursor: Option<Box<dyn Cursor>> = if count_only {
            None
        } else {
            if let Some(fields) = hints.field_projection() {
                selected = selected
                    .iter()
                    .map(|doc| project_document(doc, &fields))
                    .collect();
            }
            Some(Box::new(MemoryCursor::new(
                selected,
                Arc::clone(&self.open_cursors),
            )))
        };

        Ok(QueryReply {
            cursor,
            count,
            log: wants_log.then(|| log_lines.join("\n")),
        })
    }

    fn set_index(&self, name: &str, path: &str, flag_bits: u32) -> Result<()> {
        let mut state = self.state.write();
        Self::check_open(&state)?;
        if flag_bits == 0 {
            return Err(JotError::engine("no index flags supplied"));
        }
        let Some(coll) = state.collections.get_mut(name) else {
            return Err(JotError::engine(format!(
                "collection '{}' does not exist",
                name
            )));
        };

        let type_bits = flag_bits & flags::INDEX_TYPE_MASK;
        if flag_bits & flags::INDEX_DROP_ALL != 0 {
            coll.indexes.remove(path);
        } else if flag_bits & flags::INDEX_DROP != 0 {
            if let Some(bits) = coll.indexes.get_mut(path) {
                *bits &= !type_bits;
                if *bits == 0 {
                    coll.indexes.remove(path);
                }
            }
        } else if type_bits != 0 {
            // ensure / rebuild both leave the type registered
            *coll.indexes.entry(path.to_string()).or_insert(0) |= type_bits;
        }
        // INDEX_OPTIMIZE alone changes nothing observable here.

        self.index_journal.lock().push(IndexCall {
            collection: name.to_string(),
            path: path.to_string(),
            flags: flag_bits,
        });
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        let state = self.state.read();
        Self::check_open(&state)?;
        Ok(())
    }
}

// ========== QUERY EXECUTION ==========

fn id_key(id: &DocumentId) -> String {
    id.to_value().to_string()
}

fn as_object(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    }
}

/// Split the wire argument vector `[predicate, ...or, hints]`.
fn split_args(args: &[Value]) -> (Map<String, Value>, &[Value], Hints) {
    match args {
        [] => (Map::new(), &[], Hints::new()),
        [predicate] => (as_object(predicate), &[], Hints::new()),
        [predicate, middle @ .., hints] => {
            (as_object(predicate), middle, Hints::from_value(hints))
        }
    }
}

#[derive(Default)]
struct UpdateOps {
    set: Option<Map<String, Value>>,
    inc: Option<Map<String, Value>>,
    add_to_set: Option<Map<String, Value>>,
    pull: Option<Map<String, Value>>,
    drop_all: bool,
}

impl UpdateOps {
    fn is_empty(&self) -> bool {
        self.set.is_none()
            && self.inc.is_none()
            && self.add_to_set.is_none()
            && self.pull.is_none()
            && !self.drop_all
    }
}

/// Split a predicate into match criteria and mutation operators.
fn partition_predicate(predicate: Map<String, Value>) -> Result<(Map<String, Value>, UpdateOps)> {
    let mut criteria = Map::new();
    let mut ops = UpdateOps::default();
    for (key, value) in predicate {
        match key.as_str() {
            "$set" => ops.set = Some(expect_object(value, "$set")?),
            "$inc" => ops.inc = Some(expect_object(value, "$inc")?),
            "$addToSet" => ops.add_to_set = Some(expect_object(value, "$addToSet")?),
            "$pull" => ops.pull = Some(expect_object(value, "$pull")?),
            "$dropall" => ops.drop_all = truthy(&value),
            _ if key.starts_with('$') => {
                return Err(JotError::engine(format!("unknown query operator: {}", key)));
            }
            _ => {
                criteria.insert(key, value);
            }
        }
    }
    Ok((criteria, ops))
}

fn expect_object(value: Value, op: &str) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(JotError::engine(format!("{} requires an object", op))),
    }
}

fn run_update(
    state: &mut State,
    name: &str,
    criteria: &Map<String, Value>,
    or: &[Value],
    ops: &UpdateOps,
) -> Result<u64> {
    let Some(coll) = state.collections.get_mut(name) else {
        return Ok(0);
    };

    let mut matched = Vec::new();
    for (key, doc) in coll.docs.iter() {
        if matches_any(criteria, or, doc)? {
            matched.push(key.clone());
        }
    }

    let mut count = 0u64;
    if ops.drop_all {
        for key in matched {
            coll.docs.remove(&key);
            count += 1;
        }
        return Ok(count);
    }

    for key in matched {
        if let Some(doc) = coll.docs.get_mut(&key) {
            if apply_update_ops(doc, ops) {
                count += 1;
            }
        }
    }
    Ok(count)
}

/// A document matches when the primary criteria match, or any alternative
/// predicate does.
fn matches_any(criteria: &Map<String, Value>, or: &[Value], doc: &Value) -> Result<bool> {
    if matches_criteria(criteria, doc)? {
        return Ok(true);
    }
    for alt in or {
        if let Value::Object(map) = alt {
            if matches_criteria(map, doc)? {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn matches_criteria(criteria: &Map<String, Value>, doc: &Value) -> Result<bool> {
    for (path, condition) in criteria {
        if path.starts_with('$') {
            return Err(JotError::engine(format!(
                "unknown query operator: {}",
                path
            )));
        }
        if !matches_condition(resolve_path(doc, path), condition)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn matches_condition(field: Option<&Value>, condition: &Value) -> Result<bool> {
    match condition {
        Value::Object(ops) if ops.keys().any(|k| k.starts_with('$')) => {
            for (op, operand) in ops {
                if !matches_operator(field, op, operand)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        // Plain literal: equality, with array fields matching any element.
        _ => Ok(field.map_or(false, |value| eq_match(value, condition))),
    }
}

fn matches_operator(field: Option<&Value>, op: &str, operand: &Value) -> Result<bool> {
    use std::cmp::Ordering;

    match op {
        "$not" => Ok(!matches_condition(field, operand)?),

        "$exists" => Ok(field.is_some() == truthy(operand)),

        "$begin" => {
            let Some(prefix) = operand.as_str() else {
                return Err(JotError::engine("$begin requires a string"));
            };
            Ok(string_match(field, |s| s.starts_with(prefix)))
        }

        "$gt" => Ok(ordered_match(field, operand, |o| o == Ordering::Greater)),
        "$gte" => Ok(ordered_match(field, operand, |o| o != Ordering::Less)),
        "$lt" => Ok(ordered_match(field, operand, |o| o == Ordering::Less)),
        "$lte" => Ok(ordered_match(field, operand, |o| o != Ordering::Greater)),

        "$bt" => {
            let bounds = match operand {
                Value::Array(items) if items.len() == 2 => items,
                _ => return Err(JotError::engine("$bt requires a two-element array")),
            };
            let lo = &bounds[0];
            let hi = &bounds[1];
            // Either bound order is accepted.
            let within =
                |o: Ordering, p: Ordering| o != Ordering::Less && p != Ordering::Greater;
            Ok(scalar_match(field, |value| {
                match (compare_values(value, lo), compare_values(value, hi)) {
                    (Some(a), Some(b)) => within(a, b) || within(b, a),
                    _ => false,
                }
            }))
        }

        "$in" => {
            let Value::Array(choices) = operand else {
                return Err(JotError::engine("$in requires an array"));
            };
            Ok(field.map_or(false, |value| {
                choices.iter().any(|choice| eq_match(value, choice))
            }))
        }

        "$nin" => {
            let Value::Array(choices) = operand else {
                return Err(JotError::engine("$nin requires an array"));
            };
            Ok(field.map_or(true, |value| {
                !choices.iter().any(|choice| eq_match(value, choice))
            }))
        }

        "$strand" => {
            let tokens = string_tokens_of(operand)?;
            Ok(field.map_or(false, |value| {
                let have = field_tokens(value);
                tokens.iter().all(|t| have.contains(t))
            }))
        }

        "$stror" => {
            let tokens = string_tokens_of(operand)?;
            Ok(field.map_or(false, |value| {
                let have = field_tokens(value);
                tokens.iter().any(|t| have.contains(t))
            }))
        }

        "$icase" => match operand {
            Value::String(target) => Ok(string_match(field, |s| s.eq_ignore_ascii_case(target))),
            Value::Object(inner) => match inner.get("$in") {
                Some(Value::Array(choices)) => Ok(string_match(field, |s| {
                    choices
                        .iter()
                        .filter_map(Value::as_str)
                        .any(|choice| s.eq_ignore_ascii_case(choice))
                })),
                _ => Err(JotError::engine(
                    "$icase requires a string or an $in clause",
                )),
            },
            _ => Err(JotError::engine(
                "$icase requires a string or an $in clause",
            )),
        },

        _ => Err(JotError::engine(format!("unknown query operator: {}", op))),
    }
}

/// Equality with array-contains semantics for array fields.
fn eq_match(field: &Value, target: &Value) -> bool {
    if field == target {
        return true;
    }
    matches!(field, Value::Array(items) if items.contains(target))
}

/// Apply a string predicate to a scalar field or each element of an array
/// field.
fn string_match<F: Fn(&str) -> bool>(field: Option<&Value>, pred: F) -> bool {
    match field {
        Some(Value::String(s)) => pred(s),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .any(pred),
        _ => false,
    }
}

/// Apply a scalar predicate to the field, or to each element of an array
/// field.
fn scalar_match<F: Fn(&Value) -> bool>(field: Option<&Value>, pred: F) -> bool {
    match field {
        Some(Value::Array(items)) => items.iter().any(pred),
        Some(value) => pred(value),
        None => false,
    }
}

fn ordered_match<F: Fn(std::cmp::Ordering) -> bool>(
    field: Option<&Value>,
    operand: &Value,
    accept: F,
) -> bool {
    scalar_match(field, |value| {
        compare_values(value, operand).map_or(false, &accept)
    })
}

/// Comparable scalar ordering: numbers by magnitude, strings and bools
/// lexicographically. Mixed types do not compare.
fn compare_values(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Number(n1), Value::Number(n2)) => {
            let f1 = n1.as_f64()?;
            let f2 = n2.as_f64()?;
            f1.partial_cmp(&f2)
        }
        (Value::String(s1), Value::String(s2)) => Some(s1.cmp(s2)),
        (Value::Bool(b1), Value::Bool(b2)) => Some(b1.cmp(b2)),
        _ => None,
    }
}

/// Token list out of a `$strand`/`$stror` operand: an array of strings,
/// or one whitespace-separated string.
fn string_tokens_of(operand: &Value) -> Result<Vec<String>> {
    match operand {
        Value::Array(items) => Ok(items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()),
        Value::String(s) => Ok(s.split_whitespace().map(str::to_string).collect()),
        _ => Err(JotError::engine(
            "token operators require a string or an array of strings",
        )),
    }
}

/// Token set of a field value: elements of a string array, or the
/// whitespace-separated words of a string.
fn field_tokens(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Value::String(s) => s.split_whitespace().map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Walk a dotted field path through nested objects.
fn resolve_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

fn path_mut<'a>(doc: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.get_mut(segment)?;
    }
    Some(current)
}

/// Set a dotted field path in place, creating intermediate objects.
fn set_path(doc: &mut Value, path: &str, value: Value) {
    let (parents, last) = match path.rsplit_once('.') {
        Some((parents, last)) => (parents, last),
        None => ("", path),
    };

    let mut current = doc;
    if !parents.is_empty() {
        for segment in parents.split('.') {
            let Value::Object(map) = current else { return };
            current = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
    }
    if let Value::Object(map) = current {
        map.insert(last.to_string(), value);
    }
}

/// Apply mutation operators to one document; reports whether anything
/// changed.
fn apply_update_ops(doc: &mut Value, ops: &UpdateOps) -> bool {
    let mut modified = false;

    if let Some(set) = &ops.set {
        for (path, value) in set {
            set_path(doc, path, value.clone());
            modified = true;
        }
    }

    if let Some(inc) = &ops.inc {
        for (path, delta) in inc {
            let Some(current) = resolve_path(doc, path) else {
                continue;
            };
            // Integers first, so integer fields stay integers.
            let next = if let (Some(c), Some(d)) = (current.as_i64(), delta.as_i64()) {
                Some(Value::from(c + d))
            } else if let (Some(c), Some(d)) = (current.as_f64(), delta.as_f64()) {
                Some(Value::from(c + d))
            } else {
                None
            };
            if let Some(next) = next {
                set_path(doc, path, next);
                modified = true;
            }
        }
    }

    if let Some(add) = &ops.add_to_set {
        for (path, value) in add {
            match path_mut(doc, path) {
                Some(Value::Array(items)) => {
                    if !items.contains(value) {
                        items.push(value.clone());
                        modified = true;
                    }
                }
                None => {
                    set_path(doc, path, Value::Array(vec![value.clone()]));
                    modified = true;
                }
                Some(_) => {} // not an array; leave it alone
            }
        }
    }

    if let Some(pull) = &ops.pull {
        for (path, value) in pull {
            if let Some(Value::Array(items)) = path_mut(doc, path) {
                let before = items.len();
                items.retain(|item| item != value);
                if items.len() != before {
                    modified = true;
                }
            }
        }
    }

    modified
}

/// Merge the top-level fields of `incoming` into `existing`.
fn merge_into(existing: &mut Value, incoming: &Value) {
    if let (Value::Object(into), Value::Object(from)) = (existing, incoming) {
        for (key, value) in from {
            into.insert(key.clone(), value.clone());
        }
    }
}

/// Multi-field sort; direction 1 ascending, -1 descending. Missing fields
/// sort first.
fn sort_documents(docs: &mut [Value], order: &[(String, i64)]) {
    docs.sort_by(|a, b| {
        for (field, direction) in order {
            let cmp = compare_optional(resolve_path(a, field), resolve_path(b, field));
            if cmp != std::cmp::Ordering::Equal {
                return if *direction >= 0 { cmp } else { cmp.reverse() };
            }
        }
        std::cmp::Ordering::Equal
    });
}

fn compare_optional(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => {
            compare_values(a, b).unwrap_or_else(|| type_priority(a).cmp(&type_priority(b)))
        }
    }
}

/// Type bucket order for mixed-type sorting.
fn type_priority(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Bool(_) => 3,
        Value::Object(_) => 4,
        Value::Array(_) => 5,
    }
}

/// Keep only the requested field paths (plus the identifier).
fn project_document(doc: &Value, fields: &[String]) -> Value {
    let mut result = Map::new();
    for path in fields {
        if let Some(value) = resolve_path(doc, path) {
            result.insert(path.clone(), value.clone());
        }
    }
    if let Some(id) = doc.get(ID_FIELD) {
        result.insert(ID_FIELD.to_string(), id.clone());
    }
    Value::Object(result)
}

fn attach_log(err: JotError, wants_log: bool, lines: &[String]) -> JotError {
    if !wants_log {
        return err;
    }
    match err {
        JotError::Engine { message, log: None } => {
            let mut all = lines.to_vec();
            all.push(format!("error: {}", message));
            JotError::Engine {
                message,
                log: Some(all.join("\n")),
            }
        }
        other => other,
    }
}

// ========== CURSOR ==========

struct MemoryCursor {
    docs: Vec<Value>,
    current: Option<usize>,
    upcoming: usize,
    closed: bool,
    gauge: Arc<AtomicUsize>,
}

impl MemoryCursor {
    fn new(docs: Vec<Value>, gauge: Arc<AtomicUsize>) -> Self {
        gauge.fetch_add(1, Ordering::SeqCst);
        MemoryCursor {
            docs,
            current: None,
            upcoming: 0,
            closed: false,
            gauge,
        }
    }
}

impl Cursor for MemoryCursor {
    fn next(&mut self) -> bool {
        if self.closed {
            return false;
        }
        if self.upcoming < self.docs.len() {
            self.current = Some(self.upcoming);
            self.upcoming += 1;
            true
        } else {
            self.current = None;
            false
        }
    }

    fn object(&self) -> Result<Value> {
        if self.closed {
            return Err(JotError::engine("cursor is closed"));
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
        self.docs.clear();
        self.gauge.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}
