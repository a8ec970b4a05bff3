//! System clipboard access through the platform's copy helpers.

use crate::error::{Error, Result};
use crate::traits::{ClipboardSink, CommandRunner};

/// Copy helpers, tried in order until one succeeds.
const COPY_PROGRAMS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip", &[]),
];

/// Clipboard that pipes text into the first working copy helper on PATH.
#[derive(Debug, Clone, Copy)]
pub struct CommandClipboard<'a, R: CommandRunner> {
    runner: &'a R,
}

impl<'a, R: CommandRunner> CommandClipboard<'a, R> {
    /// Create a clipboard backed by `runner`.
    #[must_use]
    pub const fn new(runner: &'a R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> ClipboardSink for CommandClipboard<'_, R> {
    fn copy(&self, text: &str) -> Result<()> {
        let mut failures = Vec::new();

        for (program, args) in COPY_PROGRAMS {
            if !self.runner.is_available(program) {
                continue;
            }
            match self.runner.run(program, args, Some(text)) {
                Ok(output) if output.success() => return Ok(()),
                Ok(output) => failures.push(format!("{program} exited with {}", output.exit_code)),
                Err(e) => failures.push(format!("{program}: {e}")),
            }
        }

        if failures.is_empty() {
            Err(Error::ClipboardUnavailable("no clipboard helper found on PATH".to_string()))
        } else {
            Err(Error::ClipboardUnavailable(failures.join("; ")))
        }
    }
}
