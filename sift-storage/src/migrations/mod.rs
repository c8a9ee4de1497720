//! Schema migrations using PRAGMA user_version.

pub mod v001_entity_tables;
pub mod v002_embedding_columns;

use rusqlite::Connection;

use sift_core::errors::{SiftResult, StorageError};

type Migration = fn(&Connection) -> SiftResult<()>;

const MIGRATIONS: &[(u32, Migration)] = &[
    (1, v001_entity_tables::migrate),
    (2, v002_embedding_columns::migrate),
];

/// Latest schema version known to this build.
pub const LATEST_VERSION: u32 = 2;

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> SiftResult<()> {
    run_migrations_to(conn, LATEST_VERSION)
}

/// Run pending migrations up to and including `target`.
pub fn run_migrations_to(conn: &Connection, target: u32) -> SiftResult<()> {
    let current = current_version(conn)?;

    for (version, migrate) in MIGRATIONS {
        if *version <= current || *version > target {
            continue;
        }
        migrate(conn).map_err(|e| StorageError::MigrationFailed {
            version: *version,
            reason: e.to_string(),
        })?;
        conn.pragma_update(None, "user_version", version)
            .map_err(|e| StorageError::MigrationFailed {
                version: *version,
                reason: e.to_string(),
            })?;
        tracing::info!(version = version, "applied migration");
    }

    Ok(())
}

/// Get the current schema version.
pub fn current_version(conn: &Connection) -> SiftResult<u32> {
    let version = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
    Ok(version)
}
