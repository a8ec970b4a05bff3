//! Testing utilities and mock implementations.
//!
//! These types are provided for use in tests. They may appear unused in
//! the library itself but are consumed by unit and integration tests.

#![allow(dead_code)]
#![allow(clippy::needless_pass_by_ref_mut)] // &mut self for ergonomics with RefCell

use crate::error::{Error, Result};
use crate::traits::{ClipboardSink, CommandOutput, CommandRunner};
use std::cell::RefCell;

/// One expected call: program, arguments, stdin, and the output to return.
type Expectation = (String, Vec<String>, Option<String>, CommandOutput);

/// A mock command runner for testing.
///
/// Records expected commands and their outputs, then verifies they were called.
#[derive(Debug, Default)]
pub struct MockCommandRunner {
    expectations: RefCell<Vec<Expectation>>,
    available_programs: RefCell<Vec<String>>,
    call_index: RefCell<usize>,
}

impl MockCommandRunner {
    /// Create a new mock command runner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an expected command (without stdin) and its output.
    pub fn expect(&mut self, program: &str, args: &[&str], output: CommandOutput) {
        self.push(program, args, None, output);
    }

    /// Add an expected command fed `input` on stdin, and its output.
    pub fn expect_with_input(
        &mut self,
        program: &str,
        args: &[&str],
        input: &str,
        output: CommandOutput,
    ) {
        self.push(program, args, Some(input.to_string()), output);
    }

    fn push(&self, program: &str, args: &[&str], input: Option<String>, output: CommandOutput) {
        self.expectations.borrow_mut().push((
            program.to_string(),
            args.iter().map(|s| (*s).to_string()).collect(),
            input,
            output,
        ));
    }

    /// Add a program as available.
    pub fn set_available(&mut self, program: &str) {
        self.available_programs.borrow_mut().push(program.to_string());
    }

    /// Verify all expected commands were called.
    ///
    /// # Panics
    ///
    /// Panics if not all expected commands were called.
    pub fn verify(&self) {
        let index = *self.call_index.borrow();
        let expected = self.expectations.borrow().len();
        assert_eq!(
            index, expected,
            "Expected {expected} command calls, but only {index} were made"
        );
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, program: &str, args: &[&str], input: Option<&str>) -> Result<CommandOutput> {
        let mut index = self.call_index.borrow_mut();
        let expectations = self.expectations.borrow();

        assert!(
            *index < expectations.len(),
            "Unexpected command call: {program} {args:?} (no more expectations)"
        );

        let (exp_program, exp_args, exp_input, output) = &expectations[*index];
        let args_vec: Vec<String> = args.iter().map(|s| (*s).to_string()).collect();

        assert!(
            program == exp_program && &args_vec == exp_args && input == exp_input.as_deref(),
            "Command mismatch at index {}:\n  Expected: {} {:?} <- {:?}\n  Got: {} {:?} <- {:?}",
            *index,
            exp_program,
            exp_args,
            exp_input,
            program,
            args,
            input
        );

        *index += 1;
        Ok(output.clone())
    }

    fn is_available(&self, program: &str) -> bool {
        self.available_programs.borrow().iter().any(|p| p == program)
    }
}

/// A command runner that always fails, for testing error paths.
#[derive(Debug, Default)]
pub struct FailingCommandRunner {
    error_message: String,
}

impl FailingCommandRunner {
    /// Create a new failing command runner with the specified error message.
    #[must_use]
    pub fn new(error_message: impl Into<String>) -> Self {
        Self { error_message: error_message.into() }
    }
}

impl CommandRunner for FailingCommandRunner {
    fn run(&self, _program: &str, _args: &[&str], _input: Option<&str>) -> Result<CommandOutput> {
        Err(std::io::Error::other(self.error_message.clone()).into())
    }

    fn is_available(&self, _program: &str) -> bool {
        false
    }
}

/// An in-memory clipboard that records everything copied to it.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: RefCell<Vec<String>>,
}

impl MemoryClipboard {
    /// Create an empty clipboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently copied text.
    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.contents.borrow().last().cloned()
    }

    /// How many times text was copied.
    #[must_use]
    pub fn copies(&self) -> usize {
        self.contents.borrow().len()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        self.contents.borrow_mut().push(text.to_string());
        Ok(())
    }
}

/// A clipboard that is never available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClipboard;

impl ClipboardSink for NoClipboard {
    fn copy(&self, _text: &str) -> Result<()> {
        Err(Error::ClipboardUnavailable("no clipboard in tests".to_string()))
    }
}
