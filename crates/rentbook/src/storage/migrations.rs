//! Schema versioning for the `SQLite` medium.
//!
//! This versions the medium's own table layout. Collection contents are
//! versioned only through the key generation marker.

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Error, Result};

use super::schema::{ADD_KV_UPDATED_AT, CREATE_KV_TABLE, CREATE_METADATA_TABLE};

/// The schema version this build writes.
pub const CURRENT_VERSION: i32 = 2;

/// Metadata key holding the schema version.
const VERSION_KEY: &str = "schema_version";

type Migration = fn(&Connection) -> Result<()>;

/// Migrations by the version they produce, ascending.
const MIGRATIONS: &[(i32, Migration)] = &[(1, create_kv as Migration), (2, add_updated_at)];

/// Bring the medium schema up to [`CURRENT_VERSION`].
///
/// Each pending migration runs in its own transaction together with the
/// version bump, so an interrupted upgrade resumes where it stopped.
///
/// # Errors
///
/// Returns an error if the stored version is unreadable or newer than
/// this build, or if a migration fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;

    let version = schema_version(conn)?;
    if version > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }

    for (target, migrate) in MIGRATIONS.iter().filter(|(v, _)| *v > version) {
        debug!("Migrating medium schema to version {}", target);
        let tx = conn.unchecked_transaction()?;
        migrate(&tx)?;
        set_schema_version(&tx, *target)?;
        tx.commit()?;
    }

    Ok(())
}

/// Read the schema version; 0 for a fresh database.
pub fn schema_version(conn: &Connection) -> Result<i32> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

fn create_kv(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_KV_TABLE, [])?;
    Ok(())
}

fn add_updated_at(conn: &Connection) -> Result<()> {
    conn.execute(ADD_KV_UPDATED_AT, [])?;
    Ok(())
}
