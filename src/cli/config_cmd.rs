//! Settings CLI subcommands.

use clap::Subcommand;

/// Settings management commands.
///
/// Settings live in `settings.yaml` in the config directory. Only the keys
/// below exist; a file with any other key is rejected.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Print the current settings.
    Show,

    /// Set the background color (`#RRGGBB`).
    #[command(name = "set-color")]
    SetColor {
        /// Hex color, e.g. '#FFEEDD'
        color: String,
    },

    /// Set how often the elapsed time refreshes, in seconds.
    #[command(name = "set-tick")]
    SetTick {
        /// Seconds between refreshes (at least 1)
        seconds: u64,
    },

    /// Keep the window above other windows.
    #[command(name = "set-on-top")]
    SetOnTop {
        /// true or false
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },

    /// Append store and export activity to activity.jsonl.
    #[command(name = "set-debug-logging")]
    SetDebugLogging {
        /// true or false
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}
