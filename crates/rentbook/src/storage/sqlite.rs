//! `SQLite`-backed storage medium.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::migrations;
use super::schema::{SELECT_KEY_SIZES, SELECT_VALUE, UPSERT_VALUE};
use super::StorageMedium;

/// Path reported for in-memory databases.
const MEMORY_PATH: &str = ":memory:";

/// A [`StorageMedium`] persisted in a single `SQLite` file.
///
/// Each `set` is one upsert statement, so a write to one key either
/// lands completely or not at all.
#[derive(Debug)]
pub struct SqliteMedium {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteMedium {
    /// Open or create a database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// then brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory database, discarded on drop.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(MEMORY_PATH),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(MEMORY_PATH),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Describe what the medium currently holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<MediumStats> {
        let mut stmt = self.conn.prepare(SELECT_KEY_SIZES)?;
        let keys = stmt
            .query_map([], |row| {
                Ok(KeyStats {
                    key: row.get(0)?,
                    value_bytes: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let db_size_bytes = if self.path.as_os_str() == MEMORY_PATH {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(MediumStats {
            schema_version: migrations::schema_version(&self.conn)?,
            keys,
            db_size_bytes,
        })
    }
}

impl StorageMedium for SqliteMedium {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(SELECT_VALUE, [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(UPSERT_VALUE, params![key, value])?;
        Ok(())
    }
}

/// Size of one stored key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyStats {
    /// Storage key.
    pub key: String,
    /// Length of the stored value.
    pub value_bytes: i64,
}

/// Statistics about the medium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediumStats {
    /// Schema version of the database.
    pub schema_version: i32,
    /// Every stored key, sorted.
    pub keys: Vec<KeyStats>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
