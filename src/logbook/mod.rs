//! Task log.
//!
//! This module provides an append-only record of what the user said they
//! were doing and when:
//! - Tasks, a deduplicated dictionary of labels (case-insensitive)
//! - Events, timestamped references to a task
//! - A single-row schema version marker with forward migrations
//!
//! # Example
//!
//! ```no_run
//! use attention_please::logbook::{LogStore, SqliteLogStore};
//!
//! let store = SqliteLogStore::open("/tmp/attention-please.sqlite3").unwrap();
//! store.record_task("write report").unwrap();
//! let suggestions = store.known_task_labels().unwrap();
//! ```

pub mod models;
pub mod schema;
pub mod store;

pub use models::{Event, Task};
pub use store::{LogStore, SqliteLogStore};

use crate::error::Result;
use crate::paths;
use std::path::Path;

/// Open the log in a resolved data directory.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or initialized.
pub fn open_in(data_dir: &Path) -> Result<SqliteLogStore> {
    SqliteLogStore::open(paths::db_path(data_dir))
}
