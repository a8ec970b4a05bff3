//! Real command execution implementation.

use crate::error::Result;
use crate::traits::{CommandOutput, CommandRunner};
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

/// Real command runner that executes programs.
#[derive(Debug, Default, Clone)]
pub struct RealCommandRunner;

impl RealCommandRunner {
    /// Create a new command runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CommandRunner for RealCommandRunner {
    fn run(&self, program: &str, args: &[&str], input: Option<&str>) -> Result<CommandOutput> {
        let Some(text) = input else {
            let output = Command::new(program).args(args).stdin(Stdio::null()).output()?;
            return Ok(CommandOutput {
                exit_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        };

        // Clipboard helpers such as xclip fork a server that inherits the
        // output pipes, so output is discarded when feeding stdin.
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        // Always reap the child, even if it stopped reading early
        let written =
            child.stdin.take().map_or(Ok(()), |mut stdin| stdin.write_all(text.as_bytes()));
        let status = child.wait()?;
        if let Err(e) = written {
            if !(e.kind() == ErrorKind::BrokenPipe && status.success()) {
                return Err(e.into());
            }
        }

        Ok(CommandOutput { exit_code: status.code().unwrap_or(-1), ..CommandOutput::default() })
    }

    fn is_available(&self, program: &str) -> bool {
        Command::new("which")
            .arg(program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_run_echo() {
        let runner = RealCommandRunner::new();
        let output = runner.run("echo", &["hello"], None).unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn test_run_feeds_stdin() {
        let runner = RealCommandRunner::new();
        let output = runner.run("sh", &["-c", "test \"$(cat)\" = hello"], Some("hello")).unwrap();
        assert!(output.success());
        assert!(output.stdout.is_empty());

        let output = runner.run("sh", &["-c", "test \"$(cat)\" = hello"], Some("bye")).unwrap();
        assert!(!output.success());
    }

    #[test]
    fn test_run_child_that_ignores_stdin() {
        let runner = RealCommandRunner::new();
        let big = "x".repeat(4 * 1024 * 1024);

        let output = runner.run("true", &[], Some(&big)).unwrap();
        assert!(output.success());

        let output = runner.run("false", &[], Some(&big));
        assert!(output.is_err() || !output.unwrap().success());
    }

    #[test]
    fn test_run_failing_command() {
        let runner = RealCommandRunner::new();
        let output = runner.run("false", &[], None).unwrap();
        assert!(!output.success());
    }

    #[test]
    fn test_run_nonexistent_command() {
        let runner = RealCommandRunner::new();
        assert!(runner.run("definitely_not_a_real_command_12345", &[], None).is_err());
    }

    #[test]
    fn test_is_available() {
        let runner = RealCommandRunner::new();
        assert!(runner.is_available("sh"));
        assert!(!runner.is_available("definitely_not_a_real_command_12345"));
    }
}
