// End-to-end tests over the in-memory reference engine.

use jotdb_core::{
    flags, CollectionOptions, Database, DocumentId, JotError, MemoryEngine, QueryRequest,
    SortOrder,
};
use serde_json::json;
use tempfile::TempDir;

fn open_db() -> (TempDir, Database<MemoryEngine>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.jot");
    let db = Database::open(&db_path, flags::OPEN_DEFAULT).unwrap();
    (temp_dir, db)
}

#[test]
fn test_open_close_lifecycle() {
    let (_temp, db) = open_db();
    assert!(db.is_open());
    db.sync().unwrap();
    db.close().unwrap();
    assert!(!db.is_open());

    // Calls after close surface engine errors.
    let users = db.collection("users");
    assert!(users.is_err());
}

#[test]
fn test_save_assigns_identifiers_in_place() {
    let (_temp, db) = open_db();
    let users = db.collection("users").unwrap();

    let mut docs = vec![json!({"a": 1}), json!({"b": 2})];
    let ids = users.save(&mut docs).unwrap();

    assert_eq!(ids.len(), 2);
    for (doc, id) in docs.iter().zip(ids.iter()) {
        // Both inputs were mutated to carry the engine-assigned id.
        assert_eq!(doc["_id"], id.to_value());
    }
}

#[test]
fn test_save_keeps_caller_supplied_identifiers() {
    let (_temp, db) = open_db();
    let users = db.collection("users").unwrap();

    let mut docs = vec![json!({"_id": 42, "a": 1})];
    let ids = users.save(&mut docs).unwrap();

    assert_eq!(ids, vec![DocumentId::Int(42)]);
    assert_eq!(docs[0]["_id"], json!(42));
}

#[test]
fn test_save_one_load_remove_roundtrip() {
    let (_temp, db) = open_db();
    let users = db.collection("users").unwrap();

    let mut doc = json!({"name": "Alice", "age": 30});
    let id = users.save_one(&mut doc).unwrap();

    let loaded = users.load(&id).unwrap().expect("document was saved");
    assert_eq!(loaded["name"], json!("Alice"));
    assert_eq!(loaded["_id"], id.to_value());

    users.remove(&id).unwrap();
    assert!(users.load(&id).unwrap().is_none());
}

#[test]
fn test_find_count_update_flow() {
    let (_temp, db) = open_db();
    let users = db.collection("users").unwrap();

    let mut docs = vec![
        json!({"name": "Alice", "age": 30, "city": "NYC"}),
        json!({"name": "Bob", "age": 25, "city": "LA"}),
        json!({"name": "Carol", "age": 35, "city": "NYC"}),
    ];
    users.save(&mut docs).unwrap();

    let count = users
        .count(&QueryRequest::new(json!({"city": "NYC"})))
        .unwrap();
    assert_eq!(count, 2);

    let oldest = users
        .find_one(
            &QueryRequest::new(json!({"city": "NYC"}))
                .with_order_by("age", SortOrder::Descending),
        )
        .unwrap()
        .unwrap();
    assert_eq!(oldest["name"], json!("Carol"));

    let outcome = users
        .update(&QueryRequest::new(
            json!({"city": "NYC", "$set": {"coast": "east"}}),
        ))
        .unwrap();
    assert_eq!(outcome.count, 2);

    let count = users
        .count(&QueryRequest::new(json!({"coast": "east"})))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn test_or_predicates_widen_the_match() {
    let (_temp, db) = open_db();
    let users = db.collection("users").unwrap();

    let mut docs = vec![
        json!({"age": 15}),
        json!({"age": 40}),
        json!({"age": 70}),
    ];
    users.save(&mut docs).unwrap();

    let count = users
        .count(
            &QueryRequest::new(json!({"age": {"$lt": 18}}))
                .with_or(json!({"age": {"$gt": 65}})),
        )
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn test_collection_options_apply_only_on_first_creation() {
    let (_temp, db) = open_db();

    let options = CollectionOptions {
        large: true,
        compressed: true,
        expected_records: Some(100_000),
        cached_records: None,
    };
    db.collection_with_options("events", &options).unwrap();

    // Second ensure with different options must not reconfigure.
    let other = CollectionOptions::default();
    db.collection_with_options("events", &other).unwrap();

    assert_eq!(db.engine().collection_options("events"), Some(options));
}

#[test]
fn test_remove_collection_erases_records() {
    let (_temp, db) = open_db();
    let users = db.collection("users").unwrap();

    let mut docs = vec![json!({"a": 1})];
    users.save(&mut docs).unwrap();
    assert_eq!(db.engine().record_count("users"), 1);

    db.remove_collection("users", true).unwrap();
    assert_eq!(db.engine().record_count("users"), 0);

    // The handle can be re-created afterwards.
    let users = db.collection("users").unwrap();
    assert_eq!(users.count(&QueryRequest::match_all()).unwrap(), 0);
}

#[test]
fn test_invalid_collection_name_fails_before_dispatch() {
    let (_temp, db) = open_db();
    let err = db.collection("").unwrap_err();
    assert!(matches!(err, JotError::InvalidArgument(_)));
}

#[test]
fn test_fields_hint_restricts_projection() {
    let (_temp, db) = open_db();
    let users = db.collection("users").unwrap();

    let mut docs = vec![json!({"name": "Alice", "age": 30, "city": "NYC"})];
    users.save(&mut docs).unwrap();

    let doc = users
        .find_one(&QueryRequest::match_all().with_field("name"))
        .unwrap()
        .unwrap();
    assert_eq!(doc["name"], json!("Alice"));
    assert!(doc.get("age").is_none());
    assert!(doc.get("_id").is_some());
}

#[test]
fn test_find_with_log_hint() {
    let (_temp, db) = open_db();
    let users = db.collection("users").unwrap();

    let mut docs = vec![json!({"a": 1}), json!({"a": 2})];
    users.save(&mut docs).unwrap();

    let result = users
        .find(&QueryRequest::new(json!({"a": 1})).with_log(true))
        .unwrap();
    let log = result.log.expect("log was requested");
    assert!(log.contains("collection: users"));
    assert!(log.contains("selected: 1 of 2"));
    result.cursor.unwrap().close().unwrap();
}
