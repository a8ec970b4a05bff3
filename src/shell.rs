//! Line-oriented interactive front-end.
//!
//! Each input line is handled to completion before the next is read. Plain
//! text submits a task; lines starting with `/` are commands. Errors abort
//! only the line that caused them.

use crate::logbook::LogStore;
use crate::session::{format_elapsed, Session, Ticker};
use crate::traits::ClipboardSink;
use chrono::{DateTime, TimeZone, Utc};
use std::io::{self, BufRead, Write};

/// Help text listing the shell commands.
pub const SHELL_HELP: &str = "Type what you are working on and press Enter.\n\
     Commands:\n  \
     /status   Show the active task and time spent on it\n  \
     /tasks    List known tasks\n  \
     /report   Print today's timesheet\n  \
     /export   Copy today's timesheet to the clipboard\n  \
     /help     Show this help\n  \
     /quit     Leave (asks again if today's work was not exported)";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellInput<'a> {
    /// Task text.
    Task(&'a str),
    /// `/status`
    Status,
    /// `/tasks`
    Tasks,
    /// `/report`
    Report,
    /// `/export`
    Export,
    /// `/help`
    Help,
    /// `/quit`
    Quit,
    /// An unrecognised `/command`.
    Unknown(&'a str),
}

/// Parse one input line.
#[must_use]
pub fn parse_line(line: &str) -> ShellInput<'_> {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return ShellInput::Task(trimmed);
    };
    match command {
        "status" => ShellInput::Status,
        "tasks" => ShellInput::Tasks,
        "report" => ShellInput::Report,
        "export" => ShellInput::Export,
        "help" | "?" => ShellInput::Help,
        "quit" | "exit" | "q" => ShellInput::Quit,
        other => ShellInput::Unknown(other),
    }
}

/// Run the shell until `/quit` (confirmed) or end of input.
///
/// `clock` supplies the current instant for each line.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails.
pub fn run_shell<S, Tz, R, W, C>(
    session: &mut Session<S>,
    clipboard: &dyn ClipboardSink,
    tz: &Tz,
    input: R,
    mut output: W,
    clock: C,
) -> io::Result<()>
where
    S: LogStore,
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
    R: BufRead,
    W: Write,
    C: Fn() -> DateTime<Utc>,
{
    let mut quit_requested = false;

    for line in input.lines() {
        let line = line?;
        let now = clock();
        let parsed = parse_line(&line);
        if parsed != ShellInput::Quit {
            quit_requested = false;
        }

        match parsed {
            ShellInput::Task("") => {}
            ShellInput::Task(text) => match session.submit_at(text, now) {
                Ok(true) => writeln!(output, "Now working on: {}", session.current_task())?,
                Ok(false) => writeln!(output, "Still working on: {}", session.current_task())?,
                Err(e) => writeln!(output, "Error: {e}")?,
            },
            ShellInput::Status => write_status(session, now, &mut output)?,
            ShellInput::Tasks => match session.suggestions() {
                Ok(labels) => {
                    for label in labels {
                        writeln!(output, "{label}")?;
                    }
                }
                Err(e) => writeln!(output, "Error: {e}")?,
            },
            ShellInput::Report => match session.report(now, tz) {
                Ok(rows) => write!(output, "{}", crate::report::render_tsv(&rows))?,
                Err(e) => writeln!(output, "Error: {e}")?,
            },
            ShellInput::Export => match session.export(clipboard, now, tz) {
                Ok(outcome) => {
                    if let Some(reason) = outcome.clipboard_error {
                        writeln!(output, "Clipboard unavailable ({reason}); copied 0 rows")?;
                    } else {
                        writeln!(output, "Copied {} rows", outcome.copied)?;
                    }
                }
                Err(e) => writeln!(output, "Error: {e}")?,
            },
            ShellInput::Help => writeln!(output, "{SHELL_HELP}")?,
            ShellInput::Quit => {
                if quit_requested {
                    return Ok(());
                }
                match session.needs_close_confirmation(now, tz) {
                    Ok(false) => return Ok(()),
                    Ok(true) => {
                        let today = session.events_today(now, tz).unwrap_or_default();
                        writeln!(
                            output,
                            "{today} entries today, {} exported. /quit again to leave anyway.",
                            session.exported_count()
                        )?;
                        quit_requested = true;
                    }
                    Err(e) => {
                        writeln!(output, "Error: {e}. /quit again to leave anyway.")?;
                        quit_requested = true;
                    }
                }
            }
            ShellInput::Unknown(command) => {
                writeln!(output, "Unknown command: /{command} (try /help)")?;
            }
        }
    }

    Ok(())
}

/// Print the active task and elapsed time every `interval_secs` seconds.
///
/// Stops after `ticks` refreshes, or runs until the process is stopped.
/// `sleep` blocks the thread until the next refresh is due.
///
/// # Errors
///
/// Returns an error only if writing output fails.
pub fn run_watch<S, W, C, P>(
    session: &mut Session<S>,
    mut output: W,
    interval_secs: u64,
    ticks: Option<u64>,
    clock: C,
    mut sleep: P,
) -> io::Result<()>
where
    S: LogStore,
    W: Write,
    C: Fn() -> DateTime<Utc>,
    P: FnMut(std::time::Duration),
{
    if ticks == Some(0) {
        return Ok(());
    }

    let mut ticker = Ticker::new(interval_secs, clock());
    let mut shown = 0;
    loop {
        let now = clock();
        if ticker.poll(now) {
            write_status(session, now, &mut output)?;
            output.flush()?;
            shown += 1;
            if ticks.is_some_and(|limit| shown >= limit) {
                return Ok(());
            }
        }
        sleep(ticker.wait_time(clock()).to_std().unwrap_or_default());
    }
}

fn write_status<S: LogStore, W: Write>(
    session: &mut Session<S>,
    now: DateTime<Utc>,
    output: &mut W,
) -> io::Result<()> {
    match session.refresh(now) {
        Ok(status) => match status.elapsed {
            Some(elapsed) => writeln!(output, "{} ({})", status.label, format_elapsed(elapsed)),
            None => writeln!(output, "Nothing recorded yet"),
        },
        Err(e) => writeln!(output, "Error: {e}"),
    }
}
