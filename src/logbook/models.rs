//! Model types for the task log.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A named activity the user reports working on.
///
/// Labels are unique under case-insensitive comparison; the casing of the
/// first submission is the one kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Surrogate key.
    pub id: i64,
    /// The label as first entered.
    pub label: String,
}

/// A record that a task became active at a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Surrogate key; breaks ties between equal timestamps.
    pub id: i64,
    /// When the task became active.
    pub timestamp: DateTime<Utc>,
    /// The referenced task.
    pub task_id: i64,
    /// Label of the referenced task.
    pub label: String,
}

/// Normalize a user-entered label for storage and comparison.
///
/// Returns `None` if nothing is left after trimming.
#[must_use]
pub fn normalize_label(label: &str) -> Option<&str> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Format a timestamp the way it is stored: RFC 3339, UTC, microseconds.
///
/// Every stored value has the same width, so text order equals time order.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
///
/// # Errors
///
/// Returns a chrono parse error if the text is not RFC 3339.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text).map(|dt| dt.with_timezone(&Utc))
}
