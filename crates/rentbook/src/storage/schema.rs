//! `SQLite` statements for the on-disk medium.
//!
//! The medium is a plain key-value table; collections live in it as
//! serialized values and have no tables of their own.

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Version 1: the key-value table.
pub const CREATE_KV_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Version 2: track when each key was last written.
pub const ADD_KV_UPDATED_AT: &str = "ALTER TABLE kv ADD COLUMN updated_at TEXT";

/// Read one value.
pub const SELECT_VALUE: &str = "SELECT value FROM kv WHERE key = ?1";

/// Insert or replace one value. A single statement, so atomic per key.
pub const UPSERT_VALUE: &str = r"
INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
";

/// Every stored key with its value size.
pub const SELECT_KEY_SIZES: &str = "SELECT key, length(value) FROM kv ORDER BY key";
