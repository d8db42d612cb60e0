// jotdb-core/src/lib.rs
// Client layer for an embedded JSON document database: request
// normalization, hint/mode translation, result projection and index flag
// composition over an opaque engine capability.

pub mod error;
pub mod flags;
pub mod document;
pub mod hints;
pub mod request;
pub mod engine;
pub mod collection;
pub mod database;
pub mod memory;

// Public exports
pub use error::{JotError, Result};
pub use document::{DocumentId, ID_FIELD};
pub use hints::{Hints, SortOrder};
pub use request::QueryRequest;
pub use engine::{CollectionOptions, Cursor, QueryReply, SaveOptions, StorageEngine};
pub use collection::{Collection, FindResult, UpdateResult};
pub use database::Database;
pub use memory::MemoryEngine;
