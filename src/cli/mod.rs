//! Command-line interface for attention-please.
//!
//! One-shot commands record and report; `shell` and `watch` are the
//! interactive front-ends that keep a session open.

mod config_cmd;
mod run;


pub use config_cmd::ConfigCommand;
pub use run::{run, run_interactive, CliOutput};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Keep track of what you are working on.
///
/// Tell it what you are doing whenever that changes; it remembers when you
/// said so and can copy a timesheet of today to the clipboard.
#[derive(Parser, Debug)]
#[command(name = "attention-please")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Keep data and settings under this directory instead of the
    /// per-user locations
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Record what you are working on now.
    ///
    /// Nothing is recorded if it is the task you are already on.
    Log {
        /// Task description (words are joined with spaces)
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Show the active task and how long it has been active.
    Current,

    /// List every task recorded so far.
    Tasks,

    /// Print today's timesheet as a tab-separated table.
    Report {
        /// Also copy the table to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Keep printing the active task and elapsed time.
    Watch {
        /// Stop after this many refreshes
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Interactive session: type tasks, /export, /quit.
    Shell,

    /// Show where data and settings are stored.
    Paths,

    /// Settings management.
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Show version information.
    Version,
}
