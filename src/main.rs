//! CLI binary for `attention_please`.
//!
//! This binary is a thin wrapper that parses arguments and delegates to the
//! library.

use clap::Parser;
use std::process::ExitCode;

use attention_please::cli::{run, Cli};

fn main() -> ExitCode {
    let output = run(Cli::parse());

    for msg in output.stdout {
        println!("{msg}");
    }
    for msg in output.stderr {
        eprintln!("{msg}");
    }

    output.exit_code
}
