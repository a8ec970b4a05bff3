//! Debug activity logging.
//!
//! When `debug_logging` is enabled in the settings, every recorded task and
//! every export is appended as a JSONL line to `activity.jsonl` in the data
//! directory.
//!
//! Errors are silently ignored: logging never breaks the action it records.

use crate::paths::ACTIVITY_LOG_FILENAME;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends activity entries to a JSONL file, or does nothing when disabled.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    path: Option<PathBuf>,
}

impl ActivityLog {
    /// A log that writes to `activity.jsonl` in `data_dir` if `enabled`.
    #[must_use]
    pub fn new(data_dir: &Path, enabled: bool) -> Self {
        Self { path: enabled.then(|| data_dir.join(ACTIVITY_LOG_FILENAME)) }
    }

    /// A log that discards everything.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { path: None }
    }

    /// Whether entries are written anywhere.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Append one entry.
    pub fn log(&self, action: &str, detail: serde_json::Value) {
        let Some(path) = &self.path else {
            return;
        };

        let entry = serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "action": action,
            "detail": detail,
        });

        let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) else {
            return;
        };

        let _ = writeln!(file, "{entry}");
    }
}
