//! Error types for `attention_please`.

/// Errors that can occur while logging, reporting or exporting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error occurred (including unknown settings keys).
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Reading from or writing to the log database failed.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The log database schema could not be created or migrated.
    #[error("Storage initialization failed: {0}")]
    StorageInit(String),

    /// A per-user directory could not be determined or created.
    #[error("Cannot resolve directory: {0}")]
    PathResolution(String),

    /// No clipboard service is available.
    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    /// A task label was empty after trimming.
    #[error("Task label must not be empty")]
    EmptyLabel,

    /// A settings value was rejected.
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
