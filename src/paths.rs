//! Path utilities for determining data and settings locations.
//!
//! The log database lives in the per-user data directory and the settings
//! document in the per-user config directory, both under an
//! `attention-please` subdirectory. Every resolver creates the directory if
//! it is missing, so calling them repeatedly is harmless.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// The application directory name inside the platform data/config dirs.
const APP_DIR_NAME: &str = "attention-please";

/// The database filename.
pub const DATABASE_FILENAME: &str = "attention-please.sqlite3";

/// The settings filename.
pub const SETTINGS_FILENAME: &str = "settings.yaml";

/// The debug activity log filename.
pub const ACTIVITY_LOG_FILENAME: &str = "activity.jsonl";

/// Resolve (and create) the per-user data directory.
///
/// Returns `<platform data dir>/attention-please/`.
///
/// # Errors
///
/// Returns [`Error::PathResolution`] if the platform has no data directory
/// or the directory cannot be created.
pub fn resolve_data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .ok_or_else(|| Error::PathResolution("no per-user data directory".to_string()))?;
    ensure_dir(base.join(APP_DIR_NAME))
}

/// Resolve (and create) the per-user config directory.
///
/// Returns `<platform config dir>/attention-please/`.
///
/// # Errors
///
/// Returns [`Error::PathResolution`] if the platform has no config directory
/// or the directory cannot be created.
pub fn resolve_config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| Error::PathResolution("no per-user config directory".to_string()))?;
    ensure_dir(base.join(APP_DIR_NAME))
}

/// Resolve (and create) the data directory under an explicit home.
///
/// # Errors
///
/// Returns [`Error::PathResolution`] if the directory cannot be created.
pub fn data_dir_in(home: &Path) -> Result<PathBuf> {
    ensure_dir(home.join("data"))
}

/// Resolve (and create) the config directory under an explicit home.
///
/// # Errors
///
/// Returns [`Error::PathResolution`] if the directory cannot be created.
pub fn config_dir_in(home: &Path) -> Result<PathBuf> {
    ensure_dir(home.join("config"))
}

/// Get the database path inside a data directory.
#[must_use]
pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DATABASE_FILENAME)
}

/// Get the settings path inside a config directory.
#[must_use]
pub fn settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join(SETTINGS_FILENAME)
}

fn ensure_dir(dir: PathBuf) -> Result<PathBuf> {
    std::fs::create_dir_all(&dir)
        .map_err(|e| Error::PathResolution(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
