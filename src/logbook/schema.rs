//! Schema version marker and forward migrations for the task log.
//!
//! The `version` table holds a single row. A file without it is at version
//! 0, which covers both fresh files and logs written before the marker
//! existed (every v1 statement is `IF NOT EXISTS`). Each migration runs in
//! its own transaction together with the version bump.

use crate::error::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension};

/// The schema version this build reads and writes.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// A single forward schema step.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Version the database is at after this step.
    pub version: u32,
    /// Short name for error messages.
    pub name: &'static str,
    /// Statements to execute.
    pub sql: &'static str,
}

const SCHEMA_V1_SQL: &str = r"
    -- Task label dictionary
    CREATE TABLE IF NOT EXISTS todo (
        id INTEGER PRIMARY KEY,
        todo_text TEXT NOT NULL UNIQUE COLLATE NOCASE
    );

    -- Append-only event log
    CREATE TABLE IF NOT EXISTS time (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        todo_id INTEGER NOT NULL REFERENCES todo(id)
    );

    CREATE INDEX IF NOT EXISTS idx_time_timestamp ON time(timestamp);

    -- Tasks and events are write-once
    CREATE TRIGGER IF NOT EXISTS todo_no_update BEFORE UPDATE ON todo BEGIN
        SELECT RAISE(ABORT, 'tasks are immutable');
    END;
    CREATE TRIGGER IF NOT EXISTS todo_no_delete BEFORE DELETE ON todo BEGIN
        SELECT RAISE(ABORT, 'tasks are never deleted');
    END;
    CREATE TRIGGER IF NOT EXISTS time_no_update BEFORE UPDATE ON time BEGIN
        SELECT RAISE(ABORT, 'events are immutable');
    END;
    CREATE TRIGGER IF NOT EXISTS time_no_delete BEFORE DELETE ON time BEGIN
        SELECT RAISE(ABORT, 'events are never deleted');
    END;

    -- Schema version marker (single row)
    CREATE TABLE IF NOT EXISTS version (
        version INTEGER NOT NULL
    );
";

/// All migrations, in ascending version order.
pub const MIGRATIONS: &[Migration] =
    &[Migration { version: 1, name: "initial_schema", sql: SCHEMA_V1_SQL }];

/// Bring the database up to [`CURRENT_SCHEMA_VERSION`].
///
/// # Errors
///
/// Returns [`Error::StorageInit`] if the database is newer than this build,
/// or if any migration fails (that migration is rolled back).
pub fn initialize(conn: &mut Connection) -> Result<()> {
    apply_migrations(conn, MIGRATIONS, CURRENT_SCHEMA_VERSION)
}

/// Read the version marker; 0 if the marker table does not exist.
///
/// # Errors
///
/// Returns an error if the marker cannot be read.
pub fn read_version(conn: &Connection) -> Result<u32> {
    let has_table: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'version')",
            [],
            |row| row.get(0),
        )
        .map_err(init_error)?;
    if !has_table {
        return Ok(0);
    }

    let version: Option<i64> = conn
        .query_row("SELECT MAX(version) FROM version", [], |row| row.get(0))
        .optional()
        .map_err(init_error)?
        .flatten();

    let version = version.unwrap_or(0);
    u32::try_from(version)
        .map_err(|_| Error::StorageInit(format!("invalid schema version {version}")))
}

fn apply_migrations(conn: &mut Connection, migrations: &[Migration], target: u32) -> Result<()> {
    let start = read_version(conn)?;
    let mut current = start;

    if current > target {
        return Err(Error::StorageInit(format!(
            "database schema version {current} is newer than supported version {target}; \
             refusing to write to it"
        )));
    }

    for migration in migrations.iter().filter(|m| m.version > start && m.version <= target) {
        let tx = conn.transaction().map_err(init_error)?;
        tx.execute_batch(migration.sql).map_err(|e| {
            Error::StorageInit(format!("migration {} ({}) failed: {e}", migration.version, migration.name))
        })?;
        tx.execute("DELETE FROM version", []).map_err(init_error)?;
        tx.execute("INSERT INTO version (version) VALUES (?1)", params![migration.version])
            .map_err(init_error)?;
        tx.commit().map_err(init_error)?;
        current = migration.version;
    }

    if current == target {
        Ok(())
    } else {
        Err(Error::StorageInit(format!(
            "no migration path from schema version {current} to {target}"
        )))
    }
}

fn init_error(e: rusqlite::Error) -> Error {
    Error::StorageInit(e.to_string())
}
