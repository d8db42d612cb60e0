// src/flags.rs
// Engine flag constants: open modes, query modes, index maintenance flags.
// Re-exported verbatim so callers can compose them without reaching into
// the engine crate.

// ========== OPEN MODES ==========

pub const OPEN_READER: u32 = 1 << 0;
pub const OPEN_WRITER: u32 = 1 << 1;
pub const OPEN_CREATE: u32 = 1 << 2;
pub const OPEN_TRUNCATE: u32 = 1 << 3;

/// Read-write, creating the database when missing.
pub const OPEN_DEFAULT: u32 = OPEN_READER | OPEN_WRITER | OPEN_CREATE;

// ========== QUERY MODES ==========

/// Suppress result materialization; the engine reports only the count.
pub const QUERY_COUNT_ONLY: u32 = 1 << 0;

// ========== INDEX FLAGS ==========
// An index maintenance call composes one type flag with zero or more
// modifier flags into a single bitmask.

pub const INDEX_DROP: u32 = 1 << 0;
pub const INDEX_DROP_ALL: u32 = 1 << 1;
pub const INDEX_OPTIMIZE: u32 = 1 << 2;
pub const INDEX_REBUILD: u32 = 1 << 3;

pub const INDEX_NUMBER: u32 = 1 << 4;
pub const INDEX_STRING: u32 = 1 << 5;
pub const INDEX_ARRAY: u32 = 1 << 6;
/// Case-insensitive string index.
pub const INDEX_ISTRING: u32 = 1 << 7;

/// Mask selecting the index type bits of a composed flag value.
pub const INDEX_TYPE_MASK: u32 = INDEX_NUMBER | INDEX_STRING | INDEX_ARRAY | INDEX_ISTRING;

/// Mask selecting the modifier bits of a composed flag value.
pub const INDEX_MODIFIER_MASK: u32 = INDEX_DROP | INDEX_DROP_ALL | INDEX_OPTIMIZE | INDEX_REBUILD;
