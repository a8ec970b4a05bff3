//! Core traits for testability and abstraction.

use crate::error::Result;

/// Output from a command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// The exit code of the command.
    pub exit_code: i32,
    /// The stdout output.
    pub stdout: String,
    /// The stderr output.
    pub stderr: String,
}

impl CommandOutput {
    /// Check if the command succeeded (exit code 0).
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Trait for running external programs.
///
/// This trait abstracts process execution for testability.
pub trait CommandRunner {
    /// Run a program with the given arguments, optionally feeding `input`
    /// to its stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or waited on.
    fn run(&self, program: &str, args: &[&str], input: Option<&str>) -> Result<CommandOutput>;

    /// Check if a program is available in PATH.
    fn is_available(&self, program: &str) -> bool;
}

/// Destination for exported text.
pub trait ClipboardSink {
    /// Replace the clipboard contents with `text`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::ClipboardUnavailable`] if there is no
    /// clipboard service to hand the text to.
    fn copy(&self, text: &str) -> Result<()>;
}
