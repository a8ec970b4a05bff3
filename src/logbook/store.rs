//! Log store trait and `SQLite` implementation.

use crate::error::{Error, Result};
use crate::logbook::models::{format_timestamp, normalize_label, parse_timestamp, Event, Task};
use crate::logbook::schema;
use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Trait for task log operations.
///
/// The log is append-only: there are no operations that update or delete
/// tasks or events. A store handle has one writer and one reader, both the
/// owning thread; it is not meant to be shared between threads.
#[allow(clippy::missing_errors_doc)]
pub trait LogStore {
    /// Record that `label` is the active task as of now.
    fn record_task(&self, label: &str) -> Result<Event> {
        self.record_task_at(label, Utc::now())
    }

    /// Record that `label` became the active task at `at`.
    ///
    /// The task is created if no task with the same label (ignoring case)
    /// exists yet. Task creation and the event append commit together.
    fn record_task_at(&self, label: &str, at: DateTime<Utc>) -> Result<Event>;

    /// Every task, sorted by label.
    fn known_tasks(&self) -> Result<Vec<Task>>;

    /// All distinct task labels, sorted, for autocompletion.
    fn known_task_labels(&self) -> Result<Vec<String>> {
        Ok(self.known_tasks()?.into_iter().map(|task| task.label).collect())
    }

    /// Every event at or after `since`, ascending by timestamp then id.
    fn events_since(&self, since: DateTime<Utc>) -> Result<Vec<Event>>;

    /// Number of events at or after `since`.
    fn count_events_since(&self, since: DateTime<Utc>) -> Result<usize>;

    /// The most recently recorded event.
    fn latest_event(&self) -> Result<Option<Event>>;

    /// Label of the most recently recorded event's task.
    fn latest_task_label(&self) -> Result<Option<String>> {
        Ok(self.latest_event()?.map(|event| event.label))
    }
}

/// SQLite-backed task log.
///
/// Holds one long-lived connection, opened once and reused for every call.
#[derive(Debug)]
pub struct SqliteLogStore {
    conn: Connection,
    db_path: Option<PathBuf>,
}

const EVENT_COLUMNS: &str = "SELECT t.id, t.timestamp, t.todo_id, d.todo_text
     FROM time t JOIN todo d ON d.id = t.todo_id";

impl SqliteLogStore {
    /// Open (or create) the log at the given database path.
    ///
    /// The parent directory must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the file cannot be opened and
    /// [`Error::StorageInit`] if the schema cannot be created or migrated.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        let conn = Connection::open(&db_path)?;
        Self::from_connection(conn, Some(db_path))
    }

    /// Open a private in-memory log.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, None)
    }

    fn from_connection(mut conn: Connection, db_path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;")?;
        schema::initialize(&mut conn)?;
        Ok(Self { conn, db_path })
    }

    /// Get the database path, if file-backed.
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// The schema version of the open database.
    ///
    /// # Errors
    ///
    /// Returns an error if the version marker cannot be read.
    pub fn schema_version(&self) -> Result<u32> {
        schema::read_version(&self.conn)
    }

    /// Parse an event from a row produced by `EVENT_COLUMNS`.
    fn parse_event(row: &rusqlite::Row) -> rusqlite::Result<Event> {
        let timestamp: String = row.get(1)?;
        let timestamp = parse_timestamp(&timestamp).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e))
        })?;

        Ok(Event { id: row.get(0)?, timestamp, task_id: row.get(2)?, label: row.get(3)? })
    }

    #[cfg(test)]
    pub(crate) const fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl LogStore for SqliteLogStore {
    fn record_task_at(&self, label: &str, at: DateTime<Utc>) -> Result<Event> {
        let label = normalize_label(label).ok_or(Error::EmptyLabel)?;
        let at = at.trunc_subsecs(6);

        // The store handle is single-threaded, so no other transaction can be open.
        let tx = self.conn.unchecked_transaction()?;

        let task = ensure_task(&tx, label)?;

        tx.execute(
            "INSERT INTO time (timestamp, todo_id) VALUES (?1, ?2)",
            params![format_timestamp(&at), task.id],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Event { id, timestamp: at, task_id: task.id, label: task.label })
    }

    fn known_tasks(&self) -> Result<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, todo_text FROM todo ORDER BY todo_text COLLATE BINARY, id")?;
        let tasks: Vec<Task> = stmt
            .query_map([], |row| Ok(Task { id: row.get(0)?, label: row.get(1)? }))?
            .collect::<rusqlite::Result<_>>()?;
        Ok(tasks)
    }

    fn events_since(&self, since: DateTime<Utc>) -> Result<Vec<Event>> {
        let sql =
            format!("{EVENT_COLUMNS} WHERE t.timestamp >= ?1 ORDER BY t.timestamp ASC, t.id ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let events: Vec<Event> = stmt
            .query_map(params![format_timestamp(&since)], Self::parse_event)?
            .collect::<rusqlite::Result<_>>()?;
        Ok(events)
    }

    fn count_events_since(&self, since: DateTime<Utc>) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM time WHERE timestamp >= ?1",
            params![format_timestamp(&since)],
            |row| row.get(0),
        )?;
        usize::try_from(count)
            .map_err(|_| Error::StorageInit(format!("invalid event count {count}")))
    }

    fn latest_event(&self) -> Result<Option<Event>> {
        let sql = format!("{EVENT_COLUMNS} ORDER BY t.timestamp DESC, t.id DESC LIMIT 1");
        let event = self.conn.query_row(&sql, [], Self::parse_event).optional()?;
        Ok(event)
    }
}

/// Find the task whose label matches `label` ignoring case, creating it if
/// there is none.
///
/// The comparison is spelled out in the queries so it holds even for log
/// files whose `todo` table predates the `NOCASE` column collation.
fn ensure_task(conn: &Connection, label: &str) -> Result<Task> {
    conn.execute(
        "INSERT INTO todo (todo_text) SELECT ?1
         WHERE NOT EXISTS (SELECT 1 FROM todo WHERE todo_text = ?1 COLLATE NOCASE)",
        params![label],
    )?;
    let task = conn.query_row(
        "SELECT id, todo_text FROM todo WHERE todo_text = ?1 COLLATE NOCASE ORDER BY id LIMIT 1",
        params![label],
        |row| Ok(Task { id: row.get(0)?, label: row.get(1)? }),
    )?;
    Ok(task)
}
