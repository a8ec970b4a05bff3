//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use crate::activity_log::ActivityLog;
use crate::cli::{Cli, Command, ConfigCommand};
use crate::clipboard::CommandClipboard;
use crate::command::RealCommandRunner;
use crate::config::{Color, Settings};
use crate::error::Result;
use crate::logbook::{self, schema, SqliteLogStore};
use crate::paths;
use crate::report::{render_tsv, LINE_END};
use crate::session::{format_elapsed, Session};
use crate::shell::{run_shell, run_watch};
use chrono::{Local, Utc};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

/// Run a parsed command line.
///
/// Interactive commands read the process's stdin and write straight to its
/// stdout; see [`run_interactive`].
pub fn run(cli: Cli) -> CliOutput {
    let home = cli.home.as_deref();

    match &cli.command {
        Command::Version => run_version(),
        Command::Paths => run_paths(home),
        Command::Config(cmd) => run_config_cmd(home, cmd),
        Command::Log { text } => run_log(home, &text.join(" ")),
        Command::Current => run_current(home),
        Command::Tasks => run_tasks(home),
        Command::Report { copy } => run_report(home, *copy),
        Command::Watch { .. } | Command::Shell => {
            let stdin = io::stdin();
            run_interactive(home, &cli.command, stdin.lock(), io::stdout().lock())
        }
    }
}

/// Run `shell` or `watch` against the given input and output streams.
pub fn run_interactive<R: BufRead, W: Write>(
    home: Option<&Path>,
    command: &Command,
    input: R,
    output: W,
) -> CliOutput {
    let env = match Environment::resolve(home) {
        Ok(env) => env,
        Err(e) => return error_output(format!("Error: {e}")),
    };
    let mut session = match env.open_session() {
        Ok(session) => session,
        Err(e) => return error_output(format!("Error opening log: {e}")),
    };

    let result = match command {
        Command::Shell => {
            let runner = RealCommandRunner::new();
            let clipboard = CommandClipboard::new(&runner);
            run_shell(&mut session, &clipboard, &Local, input, output, Utc::now)
        }
        Command::Watch { ticks } => run_watch(
            &mut session,
            output,
            env.settings.tick_interval_secs,
            *ticks,
            Utc::now,
            std::thread::sleep,
        ),
        other => return error_output(format!("Error: {other:?} is not interactive")),
    };

    match result {
        Ok(()) => CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![], stderr: vec![] },
        Err(e) => error_output(format!("Error: {e}")),
    }
}

// === Utility Commands ===

fn run_version() -> CliOutput {
    success_output(format!(
        "attention-please v{} (log schema {})",
        crate::VERSION,
        schema::CURRENT_SCHEMA_VERSION
    ))
}

fn run_paths(home: Option<&Path>) -> CliOutput {
    let (data_dir, config_dir) = match resolve_dirs(home) {
        Ok(dirs) => dirs,
        Err(e) => return error_output(format!("Error: {e}")),
    };

    CliOutput {
        exit_code: ExitCode::SUCCESS,
        stdout: vec![
            format!("database: {}", paths::db_path(&data_dir).display()),
            format!("settings: {}", paths::settings_path(&config_dir).display()),
            format!("activity log: {}", data_dir.join(paths::ACTIVITY_LOG_FILENAME).display()),
        ],
        stderr: vec![],
    }
}

// === Settings Commands ===

fn run_config_cmd(home: Option<&Path>, cmd: &ConfigCommand) -> CliOutput {
    let env = match Environment::resolve(home) {
        Ok(env) => env,
        Err(e) => return error_output(format!("Error loading settings: {e}")),
    };
    let mut settings = env.settings;

    match cmd {
        ConfigCommand::Show => {
            return match serde_yaml::to_string(&settings) {
                Ok(yaml) => success_output(yaml.trim_end().to_string()),
                Err(e) => error_output(format!("Error: {e}")),
            };
        }
        ConfigCommand::SetColor { color } => match Color::parse(color) {
            Ok(color) => settings.background_color = color,
            Err(e) => return error_output(format!("Error: {e}")),
        },
        ConfigCommand::SetTick { seconds } => settings.tick_interval_secs = *seconds,
        ConfigCommand::SetOnTop { enabled } => settings.always_on_top = *enabled,
        ConfigCommand::SetDebugLogging { enabled } => settings.debug_logging = *enabled,
    }

    match settings.save_to(&env.config_dir) {
        Ok(()) => success_output(format!(
            "Saved {}",
            paths::settings_path(&env.config_dir).display()
        )),
        Err(e) => error_output(format!("Error saving settings: {e}")),
    }
}

// === Log Commands ===

fn run_log(home: Option<&Path>, text: &str) -> CliOutput {
    if text.trim().is_empty() {
        return error_output("Error: task text is empty".to_string());
    }

    with_session(home, |session| {
        let recorded = session.submit(text)?;
        let verb = if recorded { "Now" } else { "Still" };
        Ok(success_output(format!("{verb} working on: {}", session.current_task())))
    })
}

fn run_current(home: Option<&Path>) -> CliOutput {
    with_session(home, |session| {
        let status = session.refresh(Utc::now())?;
        Ok(match status.elapsed {
            Some(elapsed) => {
                success_output(format!("{} ({})", status.label, format_elapsed(elapsed)))
            }
            None => success_output("Nothing recorded yet".to_string()),
        })
    })
}

fn run_tasks(home: Option<&Path>) -> CliOutput {
    with_session(home, |session| {
        let labels = session.suggestions()?;
        Ok(CliOutput { exit_code: ExitCode::SUCCESS, stdout: labels, stderr: vec![] })
    })
}

fn run_report(home: Option<&Path>, copy: bool) -> CliOutput {
    with_session(home, |session| {
        let now = Utc::now();
        if !copy {
            let rows = session.report(now, &Local)?;
            return Ok(success_output(table_for_stdout(&render_tsv(&rows))));
        }

        let runner = RealCommandRunner::new();
        let clipboard = CommandClipboard::new(&runner);
        let outcome = session.export(&clipboard, now, &Local)?;
        let note = match outcome.clipboard_error {
            Some(reason) => format!("Clipboard unavailable ({reason}); copied 0 rows"),
            None => format!("Copied {} rows", outcome.copied),
        };
        Ok(CliOutput {
            exit_code: ExitCode::SUCCESS,
            stdout: vec![table_for_stdout(&outcome.tsv)],
            stderr: vec![note],
        })
    })
}

// === Helper Functions ===

/// Resolved directories and settings for one invocation.
struct Environment {
    data_dir: PathBuf,
    config_dir: PathBuf,
    settings: Settings,
}

impl Environment {
    fn resolve(home: Option<&Path>) -> Result<Self> {
        let (data_dir, config_dir) = resolve_dirs(home)?;
        let settings = Settings::ensure_in(&config_dir)?;
        Ok(Self { data_dir, config_dir, settings })
    }

    fn open_session(&self) -> Result<Session<SqliteLogStore>> {
        let store = logbook::open_in(&self.data_dir)?;
        let activity = ActivityLog::new(&self.data_dir, self.settings.debug_logging);
        Session::open(store, activity)
    }
}

fn resolve_dirs(home: Option<&Path>) -> Result<(PathBuf, PathBuf)> {
    match home {
        Some(home) => Ok((paths::data_dir_in(home)?, paths::config_dir_in(home)?)),
        None => Ok((paths::resolve_data_dir()?, paths::resolve_config_dir()?)),
    }
}

fn with_session<F>(home: Option<&Path>, f: F) -> CliOutput
where
    F: FnOnce(&mut Session<SqliteLogStore>) -> Result<CliOutput>,
{
    let env = match Environment::resolve(home) {
        Ok(env) => env,
        Err(e) => return error_output(format!("Error: {e}")),
    };
    let mut session = match env.open_session() {
        Ok(session) => session,
        Err(e) => return error_output(format!("Error opening log: {e}")),
    };

    f(&mut session).unwrap_or_else(|e| error_output(format!("Error: {e}")))
}

/// The table without its final line ending, which `println!` supplies.
fn table_for_stdout(tsv: &str) -> String {
    tsv.strip_suffix(LINE_END).unwrap_or(tsv).to_string()
}

fn success_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![message], stderr: vec![] }
}

fn error_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::from(1), stdout: vec![], stderr: vec![message] }
}
