//! # `attention_please`
//!
//! Keep a running log of what you are working on and turn a day of it into
//! a timesheet.
//!
//! Every time the active task changes, one event is appended to a `SQLite`
//! log ([`logbook`]). A report ([`report`]) attributes the time between
//! consecutive events to the earlier one and renders it as tab-separated
//! text for pasting into a spreadsheet.

pub mod activity_log;
#[cfg(feature = "cli")]
pub mod cli;
pub mod clipboard;
pub mod command;
pub mod config;
pub mod error;
pub mod logbook;
pub mod paths;
pub mod report;
pub mod session;
pub mod shell;
pub mod testing;
pub mod traits;

pub use command::RealCommandRunner;
pub use error::{Error, Result};
pub use traits::{ClipboardSink, CommandRunner};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
